// RequestView - a request paired with the soldier it refers to.

use crate::domain::{request::Request, soldier::Soldier};

/// A borrowed view of a request together with its resolved soldier.
///
/// Views only exist for requests whose soldier could be found, so display
/// code never has to handle a dangling reference.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    /// The request.
    pub request: &'a Request,
    /// The soldier the request refers to.
    pub soldier: &'a Soldier,
}

impl RequestView<'_> {
    /// The soldier's department.
    #[must_use]
    pub fn department(&self) -> &str {
        &self.soldier.department
    }

    /// The soldier's full name.
    #[must_use]
    pub fn soldier_name(&self) -> &str {
        self.soldier.full_name.as_str()
    }
}
