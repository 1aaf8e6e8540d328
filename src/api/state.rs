use std::sync::Arc;

use crate::config::Config;
use crate::workflow::Workflow;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workflow: Arc<Workflow>,
}

impl AppState {
    pub fn new(config: Config, workflow: Workflow) -> Self {
        Self {
            config: Arc::new(config),
            workflow: Arc::new(workflow),
        }
    }
}
