use crate::{
    db::DbPool,
    entities::{
        material,
        ticket::{self, Department},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        clean_text, double_option, material_inventory::MaterialInventoryService,
        validate_non_negative_feet, validate_not_blank,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, FromQueryResult)]
struct ConsumptionRow {
    primary_material_id: Option<Uuid>,
    consumed: Option<Decimal>,
}

/// Feet already consumed by tickets, per material. Materials without tickets
/// are absent and read as zero.
pub async fn consumption_for_materials<C: ConnectionTrait>(
    db: &C,
    material_ids: &[Uuid],
) -> Result<HashMap<Uuid, Decimal>, ServiceError> {
    if material_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = ticket::Entity::find()
        .select_only()
        .column(ticket::Column::PrimaryMaterialId)
        .column_as(
            Expr::col(ticket::Column::TotalMaterialLength).sum(),
            "consumed",
        )
        .filter(ticket::Column::PrimaryMaterialId.is_in(material_ids.iter().copied()))
        .group_by(ticket::Column::PrimaryMaterialId)
        .into_model::<ConsumptionRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| Some((row.primary_material_id?, row.consumed.unwrap_or_default())))
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTicketRequest {
    #[validate(
        length(min = 1, max = 100, message = "Ticket number is required"),
        custom = "validate_not_blank"
    )]
    pub ticket_number: String,
    pub primary_material_id: Option<Uuid>,
    pub department: Option<Department>,
    #[validate(length(max = 100))]
    pub department_status: Option<String>,
    #[validate(custom = "validate_non_negative_feet")]
    pub total_material_length: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTicketRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub ticket_number: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub primary_material_id: Option<Option<Uuid>>,
    pub department: Option<Department>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub department_status: Option<Option<String>>,
    #[validate(custom = "validate_non_negative_feet")]
    pub total_material_length: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub id: Uuid,
    pub ticket_number: String,
    pub primary_material_id: Option<Uuid>,
    pub department: Department,
    pub department_status: Option<String>,
    pub total_material_length: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ticket::Model> for TicketResponse {
    fn from(m: ticket::Model) -> Self {
        Self {
            department: m.department(),
            id: m.id,
            ticket_number: m.ticket_number,
            primary_material_id: m.primary_material_id,
            department_status: m.department_status,
            total_material_length: m.total_material_length,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TicketFilter {
    pub material_id: Option<Uuid>,
    pub department: Option<Department>,
}

/// Service for managing production tickets
#[derive(Clone)]
pub struct TicketService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    inventory: MaterialInventoryService,
}

impl TicketService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        inventory: MaterialInventoryService,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            inventory,
        }
    }

    async fn ensure_material(&self, id: Uuid) -> Result<(), ServiceError> {
        material::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Material", id))
    }

    async fn ensure_number_free(&self, number: &str) -> Result<(), ServiceError> {
        let taken = ticket::Entity::find()
            .filter(ticket::Column::TicketNumber.eq(number))
            .count(&*self.db_pool)
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "Ticket number '{}' already exists",
                number
            )));
        }
        Ok(())
    }

    async fn find_ticket(&self, id: Uuid) -> Result<ticket::Model, ServiceError> {
        ticket::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Ticket", id))
    }

    #[instrument(skip(self))]
    pub async fn create_ticket(
        &self,
        request: CreateTicketRequest,
    ) -> Result<TicketResponse, ServiceError> {
        request.validate()?;
        let number = request.ticket_number.trim().to_string();
        self.ensure_number_free(&number).await?;
        if let Some(material_id) = request.primary_material_id {
            self.ensure_material(material_id).await?;
        }

        let now = Utc::now();
        let ticket = ticket::ActiveModel {
            id: Set(Uuid::new_v4()),
            ticket_number: Set(number),
            primary_material_id: Set(request.primary_material_id),
            department: Set(request.department.unwrap_or_default().to_string()),
            department_status: Set(clean_text(request.department_status)),
            total_material_length: Set(request.total_material_length.unwrap_or_default()),
            notes: Set(clean_text(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(ticket_id = %ticket.id, ticket_number = %ticket.ticket_number, "ticket created");
        self.event_sender
            .send_or_log(Event::TicketCreated(ticket.id))
            .await;
        if let Some(material_id) = ticket.primary_material_id {
            self.inventory
                .recompute_material_inventory(material_id)
                .await?;
        }
        Ok(ticket.into())
    }

    #[instrument(skip(self))]
    pub async fn get_ticket(&self, id: Uuid) -> Result<TicketResponse, ServiceError> {
        self.find_ticket(id).await.map(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn list_tickets(
        &self,
        filter: TicketFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<TicketResponse>, u64), ServiceError> {
        let mut query = ticket::Entity::find();
        if let Some(material_id) = filter.material_id {
            query = query.filter(ticket::Column::PrimaryMaterialId.eq(material_id));
        }
        if let Some(department) = filter.department {
            query = query.filter(ticket::Column::Department.eq(department.to_string()));
        }
        let paginator = query
            .order_by_desc(ticket::Column::CreatedAt)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let tickets = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((tickets.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn update_ticket(
        &self,
        id: Uuid,
        request: UpdateTicketRequest,
    ) -> Result<TicketResponse, ServiceError> {
        request.validate()?;
        let existing = self.find_ticket(id).await?;
        let previous_material = existing.primary_material_id;

        if let Some(number) = request.ticket_number.as_deref().map(str::trim) {
            if number != existing.ticket_number {
                self.ensure_number_free(number).await?;
            }
        }
        if let Some(Some(material_id)) = request.primary_material_id {
            self.ensure_material(material_id).await?;
        }

        let mut active: ticket::ActiveModel = existing.into();
        if let Some(number) = request.ticket_number {
            active.ticket_number = Set(number.trim().to_string());
        }
        if let Some(material_id) = request.primary_material_id {
            active.primary_material_id = Set(material_id);
        }
        if let Some(department) = request.department {
            active.department = Set(department.to_string());
        }
        if let Some(status) = request.department_status {
            active.department_status = Set(clean_text(status));
        }
        if let Some(length) = request.total_material_length {
            active.total_material_length = Set(length);
        }
        if request.notes.is_some() {
            active.notes = Set(clean_text(request.notes));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::TicketUpdated(updated.id))
            .await;

        if let Some(material_id) = updated.primary_material_id {
            self.inventory
                .recompute_material_inventory(material_id)
                .await?;
        }
        if let Some(previous) = previous_material.filter(|p| Some(*p) != updated.primary_material_id)
        {
            self.inventory
                .recompute_material_inventory(previous)
                .await?;
        }
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_ticket(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find_ticket(id).await?;
        ticket::Entity::delete_by_id(id).exec(&*self.db_pool).await?;

        info!(ticket_id = %id, "ticket deleted");
        self.event_sender.send_or_log(Event::TicketDeleted(id)).await;
        if let Some(material_id) = existing.primary_material_id {
            self.inventory
                .recompute_material_inventory(material_id)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_request_defaults_and_validation() {
        let request: CreateTicketRequest = serde_json::from_value(serde_json::json!({
            "ticket_number": "T-100",
            "department": "PRE-PRESS",
            "total_material_length": "-5"
        }))
        .unwrap();
        assert_eq!(request.department, Some(Department::PrePress));
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("total_material_length"));
    }

    #[test]
    fn update_request_can_clear_the_material() {
        let request: UpdateTicketRequest =
            serde_json::from_str(r#"{"primary_material_id": null}"#).unwrap();
        assert_eq!(request.primary_material_id, Some(None));
        assert!(request.validate().is_ok());

        let untouched: UpdateTicketRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.primary_material_id, None);
    }

    #[test]
    fn response_parses_department() {
        let now = Utc::now();
        let response = TicketResponse::from(ticket::Model {
            id: Uuid::new_v4(),
            ticket_number: "T-7".into(),
            primary_material_id: None,
            department: "WINDING".into(),
            department_status: Some("waiting".into()),
            total_material_length: dec!(120),
            notes: None,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(response.department, Department::Winding);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["department"], "WINDING");
    }
}
