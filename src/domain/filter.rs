//! Derived, read-only views over the request collection.

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::domain::{
    request::{Request, RequestStatus},
    request_view::RequestView,
    soldier::{ParseLabelError, Soldier, SoldierId},
};

/// The value that selects every status or department.
pub const WILDCARD: &str = "all";

/// Finds a soldier by identifier.
///
/// This is a linear scan; collections are expected to hold at most a few
/// hundred records.
#[must_use]
pub fn find_soldier<'a>(soldiers: &'a [Soldier], id: &SoldierId) -> Option<&'a Soldier> {
    soldiers.iter().find(|soldier| &soldier.id == id)
}

/// Status part of a [`RequestFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Match every status.
    #[default]
    All,
    /// Match only this status.
    Only(RequestStatus),
}

impl StatusFilter {
    fn matches(self, status: RequestStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(WILDCARD) {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

/// Department part of a [`RequestFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DepartmentFilter {
    /// Match every department.
    #[default]
    All,
    /// Match only soldiers in exactly this department.
    Only(String),
}

impl DepartmentFilter {
    fn matches(&self, department: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == department,
        }
    }
}

impl FromStr for DepartmentFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(WILDCARD) {
            Ok(Self::All)
        } else {
            Ok(Self::Only(s.to_string()))
        }
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Only(department) => f.write_str(department),
        }
    }
}

/// Criteria for [`filter_requests`]. All criteria must match.
///
/// The default value matches every request whose soldier can be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Case-insensitive substring of the soldier's full name. Empty matches
    /// every name.
    pub search_term: String,
    /// Status criterion.
    pub status: StatusFilter,
    /// Department criterion.
    pub department: DepartmentFilter,
}

impl RequestFilter {
    /// Whether a request, with its resolved soldier, satisfies every
    /// criterion.
    #[must_use]
    pub fn matches(&self, request: &Request, soldier: &Soldier) -> bool {
        self.matches_name(soldier.full_name.as_str())
            && self.status.matches(request.status)
            && self.department.matches(&soldier.department)
    }

    fn matches_name(&self, full_name: &str) -> bool {
        self.search_term.is_empty()
            || full_name
                .to_lowercase()
                .contains(&self.search_term.to_lowercase())
    }
}

/// Returns the requests matching `filter`, in collection order.
///
/// Requests whose soldier cannot be found are left out of every view.
#[must_use]
pub fn filter_requests<'a>(
    requests: &'a [Request],
    soldiers: &'a [Soldier],
    filter: &RequestFilter,
) -> Vec<RequestView<'a>> {
    requests
        .iter()
        .filter_map(|request| {
            let Some(soldier) = find_soldier(soldiers, &request.soldier_id) else {
                tracing::trace!(
                    "request {} refers to unknown soldier {}",
                    request.id,
                    request.soldier_id
                );
                return None;
            };
            filter
                .matches(request, soldier)
                .then_some(RequestView { request, soldier })
        })
        .collect()
}

/// The distinct, non-empty departments of the soldiers referenced by
/// `requests`, in the order they are first seen.
#[must_use]
pub fn distinct_departments<'a>(requests: &[Request], soldiers: &'a [Soldier]) -> Vec<&'a str> {
    let mut departments: Vec<&'a str> = Vec::new();
    for request in requests {
        let Some(soldier) = find_soldier(soldiers, &request.soldier_id) else {
            continue;
        };
        let department = soldier.department.as_str();
        if !department.is_empty() && !departments.contains(&department) {
            departments.push(department);
        }
    }
    departments
}

/// Number of requests in each status. Every status is present, possibly with
/// a count of zero.
#[must_use]
pub fn status_counts(requests: &[Request]) -> BTreeMap<RequestStatus, usize> {
    let mut counts: BTreeMap<RequestStatus, usize> =
        RequestStatus::ALL.iter().map(|&status| (status, 0)).collect();
    for request in requests {
        *counts.entry(request.status).or_insert(0) += 1;
    }
    counts
}
