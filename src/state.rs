use crate::models::ActionData;
use crate::repository::ActionRepository;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub actions: ActionRepository,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: ActionData) -> Self {
        Self {
            actions: ActionRepository::new(data_path, data),
        }
    }
}
