use serde::Deserialize;

use bakeops_allocation::IngredientAvailability;
use bakeops_transfer::TransferRequest;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterStoreRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterIngredientRequest {
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferItemRequest {
    pub ingredient_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    pub store_id: String,
    pub items: Vec<TransferItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub store_id: String,
    pub ingredient_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct MoveToStationRequest {
    pub store_id: String,
    pub ingredient_id: String,
    pub station: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct BulkApproveRequest {
    pub request_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsParams {
    pub store_id: String,
    pub status: Option<String>,
    pub requested_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub store_id: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn request_to_json(request: &TransferRequest) -> serde_json::Value {
    serde_json::json!({
        "id": request.id().to_string(),
        "store_id": request.store_id().to_string(),
        "status": request.status().as_str(),
        "items": request.items().iter().map(|item| serde_json::json!({
            "ingredient_id": item.ingredient_id.to_string(),
            "name": item.name,
            "quantity": item.quantity,
            "unit": item.unit,
        })).collect::<Vec<_>>(),
        "requested_by": request.requested_by(),
        "created_at": request.created_at().to_rfc3339(),
        "decided_by": request.decided_by(),
        "decided_at": request.decided_at().map(|at| at.to_rfc3339()),
    })
}

pub fn availability_to_json(row: &IngredientAvailability) -> serde_json::Value {
    serde_json::json!({
        "ingredient_id": row.ingredient_id.to_string(),
        "unit": row.unit,
        "on_hand": row.on_hand,
        "pending": row.pending,
        "available": row.available,
    })
}
