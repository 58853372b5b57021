//! The resource shape a policy backend evaluates an action against.

use gov_core::Label;

/// Normalized resource input to a policy evaluation (`spec.md` §4.2).
#[derive(Debug, Clone, Copy)]
pub struct PolicyResource<'a> {
    /// Fragment or document identifier.
    pub id: &'a str,
    /// Sensitivity label.
    pub label: Label,
    /// Source system tag.
    pub source: &'a str,
    /// Owning subject id.
    pub owner_id: &'a str,
    /// Tenant the resource belongs to.
    pub tenant: &'a str,
}
