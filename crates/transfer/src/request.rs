use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bakeops_core::{DomainError, DomainResult, IngredientId, StoreId};

use crate::store::RequestStoreError;

/// Transfer request identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferRequestId(Uuid);

impl TransferRequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TransferRequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TransferRequestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("TransferRequestId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Transfer request status lifecycle.
///
/// `pending` is the only state from which stock-affecting transitions are
/// reachable; rejecting or completing never touches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl TransferStatus {
    /// Legal transitions: pending→approved, pending→rejected,
    /// approved→completed. Everything else is illegal and reported.
    pub fn can_transition(self, to: TransferStatus) -> bool {
        matches!(
            (self, to),
            (TransferStatus::Pending, TransferStatus::Approved)
                | (TransferStatus::Pending, TransferStatus::Rejected)
                | (TransferStatus::Approved, TransferStatus::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Approved => "approved",
            TransferStatus::Rejected => "rejected",
            TransferStatus::Completed => "completed",
        }
    }
}

impl core::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransferStatus::Pending),
            "approved" => Ok(TransferStatus::Approved),
            "rejected" => Ok(TransferStatus::Rejected),
            "completed" => Ok(TransferStatus::Completed),
            other => Err(DomainError::validation(format!(
                "unknown transfer status '{other}' (expected pending, approved, rejected or completed)"
            ))),
        }
    }
}

/// One requested line: ingredient, display name/unit echoed from the
/// catalog, and a positive quantity. Immutable once the request is created;
/// approval never partially fulfills an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestItem {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
}

impl RequestItem {
    pub fn new(
        ingredient_id: IngredientId,
        name: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "item quantity must be positive, got {quantity}"
            )));
        }
        Ok(Self {
            ingredient_id,
            name: name.into(),
            quantity,
            unit: unit.into(),
        })
    }
}

/// A transfer request: intent to draw a set of ingredient quantities from
/// one store's main warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    id: TransferRequestId,
    store_id: StoreId,
    items: Vec<RequestItem>,
    status: TransferStatus,
    requested_by: String,
    created_at: DateTime<Utc>,
    decided_by: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

impl TransferRequest {
    /// Create a pending request. No stock validation happens here: a request
    /// records intent, not a reservation of physical stock.
    pub fn new(
        id: TransferRequestId,
        store_id: StoreId,
        items: Vec<RequestItem>,
        requested_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let requested_by = requested_by.into();
        if requested_by.trim().is_empty() {
            return Err(DomainError::validation("requested_by cannot be empty"));
        }
        if items.is_empty() {
            return Err(DomainError::validation(
                "a transfer request needs at least one item",
            ));
        }

        Ok(Self {
            id,
            store_id,
            items,
            status: TransferStatus::Pending,
            requested_by,
            created_at,
            decided_by: None,
            decided_at: None,
        })
    }

    pub fn id(&self) -> TransferRequestId {
        self.id
    }

    pub fn store_id(&self) -> StoreId {
        self.store_id
    }

    pub fn items(&self) -> &[RequestItem] {
        &self.items
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn decided_by(&self) -> Option<&str> {
        self.decided_by.as_deref()
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransferStatus::Pending
    }

    /// Apply a status transition, enforcing lifecycle legality.
    ///
    /// Records the deciding actor/time when moving out of `pending`.
    pub fn transition(
        &mut self,
        to: TransferStatus,
        decided_by: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), RequestStoreError> {
        if !self.status.can_transition(to) {
            return Err(RequestStoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        if matches!(to, TransferStatus::Approved | TransferStatus::Rejected) {
            self.decided_by = decided_by.map(str::to_string);
            self.decided_at = Some(at);
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item(quantity: i64) -> RequestItem {
        RequestItem::new(IngredientId::new(), "flour", quantity, "kg").unwrap()
    }

    fn test_request() -> TransferRequest {
        TransferRequest::new(
            TransferRequestId::new(),
            StoreId::new(),
            vec![test_item(4)],
            "staff-7",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_request_starts_pending() {
        let request = test_request();
        assert_eq!(request.status(), TransferStatus::Pending);
        assert!(request.decided_by().is_none());
        assert!(request.decided_at().is_none());
    }

    #[test]
    fn zero_quantity_item_is_rejected() {
        let err = RequestItem::new(IngredientId::new(), "flour", 0, "kg").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let err = TransferRequest::new(
            TransferRequestId::new(),
            StoreId::new(),
            vec![],
            "staff-7",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approve_records_decision_audit_fields() {
        let mut request = test_request();
        let at = Utc::now();
        request
            .transition(TransferStatus::Approved, Some("manager-1"), at)
            .unwrap();

        assert_eq!(request.status(), TransferStatus::Approved);
        assert_eq!(request.decided_by(), Some("manager-1"));
        assert_eq!(request.decided_at(), Some(at));
    }

    #[test]
    fn only_lifecycle_transitions_are_legal() {
        use TransferStatus::*;

        let legal = [(Pending, Approved), (Pending, Rejected), (Approved, Completed)];
        for from in [Pending, Approved, Rejected, Completed] {
            for to in [Pending, Approved, Rejected, Completed] {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn re_approving_a_decided_request_fails() {
        let mut request = test_request();
        request
            .transition(TransferStatus::Approved, Some("manager-1"), Utc::now())
            .unwrap();

        let err = request
            .transition(TransferStatus::Approved, Some("manager-2"), Utc::now())
            .unwrap_err();
        match err {
            RequestStoreError::InvalidTransition { from, to } => {
                assert_eq!(from, TransferStatus::Approved);
                assert_eq!(to, TransferStatus::Approved);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        // First decision is preserved.
        assert_eq!(request.decided_by(), Some("manager-1"));
    }

    #[test]
    fn completed_is_terminal() {
        let mut request = test_request();
        request
            .transition(TransferStatus::Approved, Some("manager-1"), Utc::now())
            .unwrap();
        request
            .transition(TransferStatus::Completed, None, Utc::now())
            .unwrap();

        for to in [
            TransferStatus::Pending,
            TransferStatus::Approved,
            TransferStatus::Rejected,
            TransferStatus::Completed,
        ] {
            assert!(request.clone().transition(to, None, Utc::now()).is_err());
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::Approved,
            TransferStatus::Rejected,
            TransferStatus::Completed,
        ] {
            let parsed: TransferStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("cancelled".parse::<TransferStatus>().is_err());
    }
}
