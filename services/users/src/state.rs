//! Application state shared across handlers

use crate::repositories::UserRepository;
use crate::service::UserService;

/// Application state shared across handlers
pub struct AppState<R: UserRepository> {
    pub user_service: UserService<R>,
}

impl<R: UserRepository> AppState<R> {
    pub fn new(user_service: UserService<R>) -> Self {
        Self { user_service }
    }
}

impl<R: UserRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            user_service: self.user_service.clone(),
        }
    }
}
