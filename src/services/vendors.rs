use crate::{
    db::DbPool,
    entities::{material, material_order, vendor},
    errors::ServiceError,
    events::{Event, EventSender},
    inventory_store::InventoryMaterial,
    services::{clean_text, validate_not_blank},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(
        length(min = 1, max = 255, message = "Vendor name is required"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VendorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<vendor::Model> for VendorResponse {
    fn from(m: vendor::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            website: m.website,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Name of a vendor, if the id is set and still resolves.
pub async fn vendor_name<C: ConnectionTrait>(
    db: &C,
    vendor_id: Option<Uuid>,
) -> Result<Option<String>, ServiceError> {
    let Some(id) = vendor_id else {
        return Ok(None);
    };
    Ok(vendor::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|v| v.name))
}

/// Every vendor name keyed by id; used to decorate material listings.
pub async fn vendor_names<C: ConnectionTrait>(db: &C) -> Result<HashMap<Uuid, String>, ServiceError> {
    Ok(vendor::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v.name))
        .collect())
}

/// Service for managing vendors
#[derive(Clone)]
pub struct VendorService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl VendorService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = vendor::Entity::find().filter(vendor::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(vendor::Column::Id.ne(id));
        }
        if query.count(&*self.db_pool).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Vendor named '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_vendor(
        &self,
        request: CreateVendorRequest,
    ) -> Result<VendorResponse, ServiceError> {
        request.validate()?;
        let name = request.name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let now = Utc::now();
        let model = vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(clean_text(request.email)),
            phone: Set(clean_text(request.phone)),
            website: Set(clean_text(request.website)),
            notes: Set(clean_text(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(vendor_id = %model.id, "vendor created");
        self.event_sender
            .send_or_log(Event::VendorCreated(model.id))
            .await;
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn get_vendor(&self, id: Uuid) -> Result<VendorResponse, ServiceError> {
        vendor::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::not_found("Vendor", id))
    }

    /// Vendors ordered by name, plus the total count.
    #[instrument(skip(self))]
    pub async fn list_vendors(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<VendorResponse>, u64), ServiceError> {
        let paginator = vendor::Entity::find()
            .order_by_asc(vendor::Column::Name)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let vendors = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((vendors.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn update_vendor(
        &self,
        id: Uuid,
        request: UpdateVendorRequest,
    ) -> Result<VendorResponse, ServiceError> {
        request.validate()?;
        let existing = vendor::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", id))?;

        let renamed = request
            .name
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| *n != existing.name);
        if let Some(name) = &renamed {
            self.ensure_name_free(name, Some(id)).await?;
        }

        let mut active: vendor::ActiveModel = existing.into();
        if let Some(name) = renamed.clone() {
            active.name = Set(name);
        }
        if request.email.is_some() {
            active.email = Set(clean_text(request.email));
        }
        if request.phone.is_some() {
            active.phone = Set(clean_text(request.phone));
        }
        if request.website.is_some() {
            active.website = Set(clean_text(request.website));
        }
        if request.notes.is_some() {
            active.notes = Set(clean_text(request.notes));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::VendorUpdated(updated.id))
            .await;
        if renamed.is_some() {
            self.republish_materials(id).await?;
        }
        Ok(updated.into())
    }

    /// Deletes the vendor; materials and orders that referenced it keep
    /// existing without a vendor.
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        vendor::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", id))?;

        let affected: Vec<Uuid> = material::Entity::find()
            .filter(material::Column::VendorId.eq(id))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        material::Entity::update_many()
            .col_expr(material::Column::VendorId, Expr::value(Option::<Uuid>::None))
            .filter(material::Column::VendorId.eq(id))
            .exec(db)
            .await?;
        material_order::Entity::update_many()
            .col_expr(
                material_order::Column::VendorId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(material_order::Column::VendorId.eq(id))
            .exec(db)
            .await?;
        vendor::Entity::delete_by_id(id).exec(db).await?;

        info!(vendor_id = %id, materials = affected.len(), "vendor deleted");
        self.event_sender.send_or_log(Event::VendorDeleted(id)).await;

        for material_id in affected {
            if let Some(m) = material::Entity::find_by_id(material_id).one(db).await? {
                self.event_sender
                    .send_or_log(Event::MaterialUpdated(InventoryMaterial::from_model(m, None)))
                    .await;
            }
        }
        Ok(())
    }

    /// Pushes the vendor's materials again so listings pick up its new name.
    async fn republish_materials(&self, vendor_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let name = vendor_name(db, Some(vendor_id)).await?;
        let materials = material::Entity::find()
            .filter(material::Column::VendorId.eq(vendor_id))
            .all(db)
            .await?;
        for m in materials {
            self.event_sender
                .send_or_log(Event::MaterialUpdated(InventoryMaterial::from_model(
                    m,
                    name.clone(),
                )))
                .await;
        }
        Ok(())
    }
}
