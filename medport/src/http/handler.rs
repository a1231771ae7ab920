use super::{
    path::{PathType, PathWithRegex},
    Error, Path,
};
use crate::controller::Controller;

use std::ops::Deref;

/// Route handler: a path and the controller serving it.
pub struct Handler {
    path: PathWithRegex,
    controller: Box<dyn Controller>,
}

impl Handler {
    pub fn new(
        path: &str,
        controller: impl Controller + 'static,
        path_type: PathType,
    ) -> Result<Self, Error> {
        Ok(Self {
            path: Path::parse(path)?.with_regex(path_type)?,
            controller: Box::new(controller),
        })
    }

    /// Serve `path` and `path/:id`.
    pub fn rest(path: &str, controller: impl Controller + 'static) -> Result<Self, Error> {
        Self::new(path, controller, PathType::Rest)
    }

    /// Serve `path` only.
    pub fn route(path: &str, controller: impl Controller + 'static) -> Result<Self, Error> {
        Self::new(path, controller, PathType::Route)
    }

    pub fn path_with_regex(&self) -> &PathWithRegex {
        &self.path
    }

    pub fn path(&self) -> &Path {
        self.path.deref()
    }

    pub fn controller_name(&self) -> &'static str {
        self.deref().controller_name()
    }
}

impl Deref for Handler {
    type Target = Box<dyn Controller>;

    fn deref(&self) -> &Self::Target {
        &self.controller
    }
}
