/// Caller context for a request.
///
/// The core does not authenticate: the hosting layer supplies the acting
/// staff identity via the `x-staff-id` header, and this context carries it
/// into handlers as `requested_by` / `decided_by`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    staff_id: String,
}

impl CallerContext {
    pub fn new(staff_id: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
        }
    }

    pub fn staff_id(&self) -> &str {
        &self.staff_id
    }
}
