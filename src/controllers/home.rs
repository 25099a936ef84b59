// src/controllers/home.rs
use std::sync::Arc;
use tracing;

use crate::{
    errors::SparrowResult,
    models::Capabilities,
    services::UserOperations,
    store::ViewStore,
    views::HomeMenu,
};

pub struct HomeController {
    users: Arc<dyn UserOperations>,
    store: ViewStore<Capabilities>,
}

impl HomeController {
    pub fn new(users: Arc<dyn UserOperations>) -> Self {
        Self {
            users,
            store: ViewStore::new(),
        }
    }

    pub fn store(&self) -> &ViewStore<Capabilities> {
        &self.store
    }

    pub async fn load(&self) -> SparrowResult<HomeMenu> {
        match self.users.get_capabilities().await {
            Ok(capabilities) => {
                let menu = HomeMenu::from_capabilities(&capabilities);
                self.store.set_data(capabilities);
                Ok(menu)
            }
            Err(err) => {
                tracing::warn!("Failed to load capabilities: {}", err);
                self.store
                    .set_error(err.banner_message("Failed to load your options"));
                Err(err)
            }
        }
    }

    pub fn menu(&self) -> Option<HomeMenu> {
        self.store.data().as_ref().map(HomeMenu::from_capabilities)
    }
}
