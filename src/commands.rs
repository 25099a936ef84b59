//! Command execution. Each command mounts the matching controller, runs one
//! action or follows the store, and prints what the screen would show.

use sparrow_ride_client::{
    ClientState, SparrowError, SparrowResult, ViewState,
    controllers::{DispatchBoardController, DriverTripController},
    models::{ActiveTrip, PendingDispatch, Trip, TripLocations, TripRequest},
    views::{self, format, status_view},
};
use tokio::sync::watch;

use crate::cli::{Cli, Commands, DriverCommand, RiderCommand};

pub async fn execute(cli: Cli, state: &ClientState) -> SparrowResult<()> {
    match cli.command {
        Commands::Login { phone, otp } => login(state, &phone, otp.as_deref()).await,
        Commands::Logout => {
            state.auth_service.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Commands::Home => home(state).await,
        Commands::Rider(command) => rider(state, command).await,
        Commands::Driver(command) => driver(state, command).await,
    }
}

async fn login(state: &ClientState, phone: &str, otp: Option<&str>) -> SparrowResult<()> {
    match otp {
        None => {
            let sent = state.auth_service.send_otp(phone).await?;
            println!("{}", sent.message.as_deref().unwrap_or("OTP sent"));
            println!("Run again with --otp <code> to finish logging in");
        }
        Some(code) => {
            state.auth_service.verify_otp(phone, code).await?;
            if state.session.is_admin() {
                state.session.clear()?;
                return Err(SparrowError::AdminSession);
            }
            println!("Logged in as {}", format::mask_phone(Some(phone)));
        }
    }
    Ok(())
}

async fn home(state: &ClientState) -> SparrowResult<()> {
    let menu = state.home().load().await?;
    for line in menu.lines() {
        println!("{line}");
    }
    Ok(())
}

async fn rider(state: &ClientState, command: RiderCommand) -> SparrowResult<()> {
    match command {
        RiderCommand::Estimate(args) => {
            let locations = TripLocations::from(args);
            let city = state.rider_service.validate_location(locations).await?;
            println!("Service area: {}", city.city_name);
            let estimates = state.rider_service.all_fare_estimates(locations).await?;
            if estimates.is_empty() {
                println!("No fares available for this route");
            }
            for estimate in estimates {
                let fare = &estimate.estimate;
                println!(
                    "{:<6} {:>8}  {:>8}  surge x{:.1}",
                    estimate.category.as_str(),
                    format::fare(fare.final_fare),
                    format::distance_km(fare.distance_km),
                    fare.surge_multiplier.unwrap_or(1.0)
                );
            }
            Ok(())
        }
        RiderCommand::Book {
            locations,
            category,
            watch,
        } => {
            let locations = TripLocations::from(locations);
            state.rider_service.validate_location(locations).await?;
            let created = state
                .rider_service
                .create_trip(TripRequest {
                    locations,
                    vehicle_category: category.into(),
                })
                .await?;
            println!("Trip {} requested ({category})", created.trip_id);
            if watch {
                watch_trip(state, created.trip_id).await?;
            }
            Ok(())
        }
        RiderCommand::Status { trip_id } => {
            let trip = state.rider_service.get_trip(trip_id).await?;
            print_trip(&trip);
            Ok(())
        }
        RiderCommand::Watch { trip_id } => watch_trip(state, trip_id).await,
        RiderCommand::Cancel { trip_id } => {
            let screen = state.rider_trip(trip_id);
            screen.mount().await?;
            let result = screen.cancel().await;
            screen.unmount().await;
            result?;
            println!("{}", screen.status_view().message);
            Ok(())
        }
        RiderCommand::Active => {
            match state.rider_service.get_active_trip().await? {
                Some(trip) => print_trip(&trip),
                None => println!("No active trip"),
            }
            Ok(())
        }
    }
}

async fn watch_trip(state: &ClientState, trip_id: i64) -> SparrowResult<()> {
    let screen = state.rider_trip(trip_id);
    screen.mount().await?;

    let mut last_line = String::new();
    follow(screen.subscribe(), |view| {
        if let Some(trip) = &view.data {
            let line = trip_line(trip, screen.pickup_otp().as_deref());
            if line != last_line {
                println!("{line}");
                last_line = line;
            }
        }
        print_banner(view);
        view.data
            .as_ref()
            .is_some_and(|trip| status_view(trip.status.as_str()).is_final)
    })
    .await;

    screen.unmount().await;
    Ok(())
}

fn trip_line(trip: &Trip, otp: Option<&str>) -> String {
    let view = views::trip_status_view(&trip.status);
    let mut line = format!("{} {} [{}]", view.icon, view.message, trip.status);
    if view.show_otp {
        if let Some(code) = otp.or(trip.pickup_otp.as_deref()) {
            line.push_str(&format!("  Pickup OTP: {code}"));
        }
    }
    line
}

fn print_trip(trip: &Trip) {
    println!("Trip {}", trip.trip_id);
    println!("  {}", trip_line(trip, None));
    if let Some(pickup) = &trip.pickup_location {
        println!("  Pickup:   {}", format::coordinates(pickup.lat, pickup.lng));
    }
    if let Some(drop) = &trip.drop_location {
        println!("  Drop:     {}", format::coordinates(drop.lat, drop.lng));
    }
    println!("  Distance: {}", format::distance_km(trip.distance_km));
    println!("  Fare:     {}", format::fare(trip.display_fare()));
    if trip.status.has_driver() {
        if let Some(driver) = &trip.driver {
            println!(
                "  Driver:   {} ({})",
                driver.full_name.as_deref().unwrap_or("Driver"),
                format::mask_phone(driver.phone_number.as_deref())
            );
        }
        if let Some(vehicle) = &trip.vehicle {
            println!(
                "  Vehicle:  {}",
                vehicle.registration_number.as_deref().unwrap_or("--")
            );
        }
    }
}

async fn driver(state: &ClientState, command: DriverCommand) -> SparrowResult<()> {
    match command {
        DriverCommand::Dashboard => {
            let dashboard = state.dashboard();
            let profile = dashboard.mount().await?;
            println!("{}", profile.display_name());
            print_shift(&dashboard.shift_view());
            Ok(())
        }
        DriverCommand::Online => {
            let dashboard = state.dashboard();
            dashboard.mount().await?;
            dashboard.go_online().await?;
            print_shift(&dashboard.shift_view());
            Ok(())
        }
        DriverCommand::Offline => {
            let dashboard = state.dashboard();
            dashboard.mount().await?;
            dashboard.go_offline().await?;
            print_shift(&dashboard.shift_view());
            Ok(())
        }
        DriverCommand::Dispatches { watch } => {
            let board = state.dispatch_board();
            board.mount().await?;
            if let Some(reason) = board.gate().await.blocked_reason {
                println!("{reason}");
            }
            if watch {
                follow(board.subscribe(), |view| {
                    print_dispatches(view.data.as_deref().unwrap_or_default());
                    print_banner(view);
                    false
                })
                .await;
            } else {
                print_dispatches(&board.store().data().unwrap_or_default());
            }
            board.unmount().await;
            Ok(())
        }
        DriverCommand::Accept { attempt_id } => {
            let accepted = with_board(state, async |board| board.accept(attempt_id).await).await?;
            println!(
                "Accepted. Trip {} is {}, fare {}",
                accepted.trip_id,
                accepted.status,
                format::fare(accepted.fare_amount)
            );
            Ok(())
        }
        DriverCommand::Reject { attempt_id } => {
            with_board(state, async |board| board.reject(attempt_id).await).await?;
            println!("Rejected dispatch {attempt_id}");
            Ok(())
        }
        DriverCommand::Trip { watch } => {
            let screen = state.driver_trip();
            screen.mount().await?;
            if watch {
                follow(screen.subscribe(), |view| {
                    match view.data.as_ref().and_then(Option::as_ref) {
                        Some(trip) => print_active_trip(trip),
                        None => println!("Waiting for a trip..."),
                    }
                    print_banner(view);
                    view.data
                        .as_ref()
                        .and_then(Option::as_ref)
                        .is_some_and(|trip| trip.status.is_terminal())
                })
                .await;
            } else {
                match screen.trip() {
                    Some(trip) => print_active_trip(&trip),
                    None => println!("No active trip"),
                }
                if let Some(label) = screen.primary_action().await.label() {
                    println!("Next: {label}");
                }
            }
            screen.unmount().await;
            Ok(())
        }
        DriverCommand::Arrive => {
            let transition = with_trip(state, async |screen| screen.mark_arrived().await).await?;
            println!("Trip {} is {}", transition.trip_id, transition.status);
            Ok(())
        }
        DriverCommand::VerifyOtp { otp } => {
            with_trip(state, async move |screen| {
                screen.enter_otp(&otp).await?;
                screen.verify_otp().await
            })
            .await?;
            println!("OTP verified");
            Ok(())
        }
        DriverCommand::Pickup { otp } => {
            let transition = with_trip(state, async move |screen| {
                screen.enter_otp(&otp).await?;
                screen.verify_otp().await?;
                screen.start_trip().await
            })
            .await?;
            println!("Trip {} is {}", transition.trip_id, transition.status);
            Ok(())
        }
        DriverCommand::Complete => {
            let transition = with_trip(state, async |screen| screen.complete_trip().await).await?;
            println!(
                "Trip {} is {}, fare {}",
                transition.trip_id,
                transition.status,
                format::fare(transition.fare_amount)
            );
            Ok(())
        }
    }
}

async fn with_board<R>(
    state: &ClientState,
    action: impl AsyncFnOnce(&DispatchBoardController) -> SparrowResult<R>,
) -> SparrowResult<R> {
    let board = state.dispatch_board();
    board.mount().await?;
    let result = action(&board).await;
    board.unmount().await;
    result
}

async fn with_trip<R>(
    state: &ClientState,
    action: impl AsyncFnOnce(&DriverTripController) -> SparrowResult<R>,
) -> SparrowResult<R> {
    let screen = state.driver_trip();
    screen.mount().await?;
    let result = action(&screen).await;
    screen.unmount().await;
    result
}

fn print_shift(view: &views::ShiftView) {
    println!("Shift: {}", view.label);
    if let Some(warning) = view.warning {
        println!("  {warning}");
    }
    if let Some(hint) = view.hint {
        println!("  {hint}");
    }
}

fn print_dispatches(dispatches: &[PendingDispatch]) {
    if dispatches.is_empty() {
        println!("No pending dispatches");
        return;
    }
    for dispatch in dispatches {
        let expiry = if dispatch.is_expired() {
            "expired".to_string()
        } else {
            format!("{}s left", dispatch.expires_in_seconds)
        };
        println!(
            "#{:<6} trip {:<6} {:<16} pickup {}  {}  ({})",
            dispatch.attempt_id,
            dispatch.trip_id,
            dispatch.rider_name.as_deref().unwrap_or("Rider"),
            format::coordinates(dispatch.pickup_lat, dispatch.pickup_lng),
            format::distance_km(dispatch.estimated_distance_km),
            expiry
        );
    }
}

fn print_active_trip(trip: &ActiveTrip) {
    println!(
        "Trip {} [{}] rider {}  pickup {}  drop {}  fare {}",
        trip.trip_id,
        trip.status,
        trip.rider_name.as_deref().unwrap_or("Rider"),
        format::coordinates(trip.pickup_lat, trip.pickup_lng),
        format::coordinates(trip.drop_lat, trip.drop_lng),
        format::fare(trip.fare_amount)
    );
}

fn print_banner<T>(view: &ViewState<T>) {
    if let Some(error) = &view.error {
        eprintln!("! {error}");
    }
}

/// Calls `render` on every store change until it returns true, the store
/// goes away, or Ctrl-C is pressed.
async fn follow<T>(mut rx: watch::Receiver<ViewState<T>>, mut render: impl FnMut(&ViewState<T>) -> bool) {
    loop {
        let done = render(&rx.borrow_and_update());
        if done {
            return;
        }
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = tokio::signal::ctrl_c() => return,
        }
    }
}
