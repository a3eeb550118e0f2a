//! Membership application service
//!
//! Handles public submission, member reads, the rejected-application
//! resubmission workflow, and the staff in-place section edit. Child
//! collections are always replaced wholesale (delete all rows for the
//! application, then bulk-insert) inside the operation's transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::application::{
    AddressPayload, ApplicationForm, BusinessTypePayload, ContactPersonPayload, DocumentPayload,
    IndustryGroupPayload, ProductPayload, ProvinceChapterPayload, RepresentativePayload,
    TypeDetails, UpdateForm,
};
use shared::types::{ApplicationStatus, MemberType};
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::services::email::Notifier;

/// Application service for submissions and resubmissions
#[derive(Clone)]
pub struct ApplicationService {
    db: PgPool,
    notifier: Notifier,
}

/// Main application row
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub member_type: String,
    pub status: i16,
    pub company_name_th: String,
    pub company_name_en: Option<String>,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub registered_capital: Option<Decimal>,
    pub employee_count: Option<i32>,
    pub admin_note: Option<String>,
    pub admin_note_by: Option<Uuid>,
    pub admin_note_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub resubmission_count: i32,
    pub resubmitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub type_details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns of the main application row, shared by the fetch queries
const APPLICATION_COLUMNS: &str = "id, user_id, member_type, status, company_name_th, \
     company_name_en, tax_id, email, phone, website, registered_capital, employee_count, \
     admin_note, admin_note_by, admin_note_at, rejection_reason, resubmission_count, \
     resubmitted_at, reviewed_by, reviewed_at, type_details, created_at, updated_at";

/// Applicant-visible view of an application (no staff annotations)
#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub id: Uuid,
    pub member_type: String,
    pub status: String,
    pub status_code: i16,
    pub company_name_th: String,
    pub company_name_en: Option<String>,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub registered_capital: Option<Decimal>,
    pub employee_count: Option<i32>,
    pub rejection_reason: Option<String>,
    pub resubmission_count: i32,
    pub resubmitted_at: Option<DateTime<Utc>>,
    pub type_details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationView {
    fn from_row(row: ApplicationRow) -> AppResult<Self> {
        let status = decode_status(row.status)?;
        Ok(Self {
            id: row.id,
            member_type: row.member_type,
            status: status.as_str().to_string(),
            status_code: row.status,
            company_name_th: row.company_name_th,
            company_name_en: row.company_name_en,
            tax_id: row.tax_id,
            email: row.email,
            phone: row.phone,
            website: row.website,
            registered_capital: row.registered_capital,
            employee_count: row.employee_count,
            rejection_reason: row.rejection_reason,
            resubmission_count: row.resubmission_count,
            resubmitted_at: row.resubmitted_at,
            type_details: row.type_details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Staff view of an application, including private annotations
#[derive(Debug, Serialize)]
pub struct AdminApplicationView {
    #[serde(flatten)]
    pub application: ApplicationView,
    pub user_id: Uuid,
    pub admin_note: Option<String>,
    pub admin_note_by: Option<Uuid>,
    pub admin_note_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl AdminApplicationView {
    fn from_row(row: ApplicationRow) -> AppResult<Self> {
        let user_id = row.user_id;
        let admin_note = row.admin_note.clone();
        let admin_note_by = row.admin_note_by;
        let admin_note_at = row.admin_note_at;
        let reviewed_by = row.reviewed_by;
        let reviewed_at = row.reviewed_at;
        Ok(Self {
            application: ApplicationView::from_row(row)?,
            user_id,
            admin_note,
            admin_note_by,
            admin_note_at,
            reviewed_by,
            reviewed_at,
        })
    }
}

// ============================================================================
// Child collection rows
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AddressRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub address_type: String,
    pub address_line: String,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RepresentativeRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub is_primary: bool,
    pub title: Option<String>,
    pub first_name_th: String,
    pub last_name_th: String,
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactPersonRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub line_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BusinessTypeRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub category_code: String,
    pub other_detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name_th: String,
    pub name_en: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IndustryGroupRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub group_code: String,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProvinceChapterRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub chapter_code: String,
    pub chapter_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub document_type: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size_bytes: Option<i64>,
    pub mime_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Full relational graph of one application
#[derive(Debug, Serialize)]
pub struct ApplicationDetail<V> {
    pub application: V,
    pub addresses: Vec<AddressRow>,
    pub representatives: Vec<RepresentativeRow>,
    pub contact_persons: Vec<ContactPersonRow>,
    pub business_types: Vec<BusinessTypeRow>,
    pub products: Vec<ProductRow>,
    pub industry_groups: Vec<IndustryGroupRow>,
    pub province_chapters: Vec<ProvinceChapterRow>,
    pub documents: Vec<DocumentRow>,
}

/// Main-field payload for the staff "main" section edit
#[derive(Debug, Deserialize)]
pub struct MainSectionInput {
    pub company_name_th: Option<String>,
    pub company_name_en: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub registered_capital: Option<Decimal>,
    pub employee_count: Option<i32>,
    pub type_details: Option<TypeDetails>,
}

impl ApplicationService {
    /// Create a new ApplicationService instance
    pub fn new(db: PgPool, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submit a new membership application (status Pending)
    pub async fn submit(
        &self,
        user_id: Uuid,
        member_type: MemberType,
        form: ApplicationForm,
    ) -> AppResult<Uuid> {
        validate_form(member_type, &form)?;

        // One open application per tax id and type at a time
        let already_open = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM applications
                WHERE tax_id = $1 AND member_type = $2 AND status IN ($3, $4)
            )
            "#,
        )
        .bind(&form.tax_id)
        .bind(member_type.as_str())
        .bind(ApplicationStatus::Pending.as_code())
        .bind(ApplicationStatus::Resubmitted.as_code())
        .fetch_one(&self.db)
        .await?;

        if already_open {
            return Err(AppError::DuplicateEntry("tax_id".to_string()));
        }

        let details = serde_json::to_value(&form.type_details)
            .map_err(|e| AppError::Internal(format!("failed to serialize type details: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let application_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO applications (
                user_id, member_type, status, company_name_th, company_name_en, tax_id,
                email, phone, website, registered_capital, employee_count, type_details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(member_type.as_str())
        .bind(ApplicationStatus::Pending.as_code())
        .bind(&form.company_name_th)
        .bind(&form.company_name_en)
        .bind(&form.tax_id)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.website)
        .bind(form.registered_capital)
        .bind(form.employee_count)
        .bind(&details)
        .fetch_one(&mut *tx)
        .await?;

        replace_addresses(&mut tx, application_id, &form.addresses).await?;
        replace_representatives(&mut tx, application_id, &form.representatives).await?;
        replace_contact_persons(&mut tx, application_id, &form.contact_persons).await?;
        replace_business_types(&mut tx, application_id, &form.business_types).await?;
        replace_products(&mut tx, application_id, &form.products).await?;
        replace_industry_groups(&mut tx, application_id, &form.industry_groups).await?;
        replace_province_chapters(&mut tx, application_id, &form.province_chapters).await?;
        replace_documents(&mut tx, application_id, &form.documents).await?;

        tx.commit().await?;

        tracing::info!(%application_id, member_type = member_type.as_str(), "application submitted");

        Ok(application_id)
    }

    // ========================================================================
    // Member reads
    // ========================================================================

    /// Get one of the caller's own applications with its full graph
    pub async fn get_owned(
        &self,
        user_id: Uuid,
        member_type: MemberType,
        application_id: Uuid,
    ) -> AppResult<ApplicationDetail<ApplicationView>> {
        let row = fetch_application(&self.db, member_type, application_id).await?;
        if row.user_id != user_id {
            return Err(AppError::InsufficientPermissions);
        }

        let children = fetch_children(&self.db, application_id).await?;
        Ok(children.into_detail(ApplicationView::from_row(row)?))
    }

    /// List the caller's applications across all member types
    pub async fn list_owned(&self, user_id: Uuid) -> AppResult<Vec<ApplicationView>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ApplicationView::from_row).collect()
    }

    /// Get an application with its full graph for the staff detail view
    pub async fn get_admin_detail(
        &self,
        member_type: MemberType,
        application_id: Uuid,
    ) -> AppResult<ApplicationDetail<AdminApplicationView>> {
        let row = fetch_application(&self.db, member_type, application_id).await?;
        let children = fetch_children(&self.db, application_id).await?;
        Ok(children.into_detail(AdminApplicationView::from_row(row)?))
    }

    // ========================================================================
    // Resubmission
    // ========================================================================

    /// Resubmit a rejected application with replacement data.
    ///
    /// Ownership is checked before any mutation. Main fields and every
    /// provided child collection are replaced in one transaction; absent
    /// collections are left untouched. On success the status becomes
    /// Resubmitted and the resubmission counter is incremented.
    pub async fn resubmit(
        &self,
        user_id: Uuid,
        member_type: MemberType,
        application_id: Uuid,
        form: UpdateForm,
    ) -> AppResult<()> {
        let row = fetch_application(&self.db, member_type, application_id).await?;

        if row.user_id != user_id {
            return Err(AppError::InsufficientPermissions);
        }

        let status = decode_status(row.status)?;
        if !status.can_transition_to(ApplicationStatus::Resubmitted) {
            return Err(AppError::InvalidStateTransition(format!(
                "only a rejected application can be resubmitted (current status: {})",
                status.as_str()
            )));
        }

        validate_update(member_type, &form)?;

        let details = form
            .type_details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("failed to serialize type details: {}", e)))?;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE applications SET
                company_name_th = COALESCE($3, company_name_th),
                company_name_en = COALESCE($4, company_name_en),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                website = COALESCE($7, website),
                registered_capital = COALESCE($8, registered_capital),
                employee_count = COALESCE($9, employee_count),
                type_details = COALESCE($10, type_details),
                status = $11,
                resubmission_count = resubmission_count + 1,
                resubmitted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND member_type = $2
            "#,
        )
        .bind(application_id)
        .bind(member_type.as_str())
        .bind(&form.company_name_th)
        .bind(&form.company_name_en)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.website)
        .bind(form.registered_capital)
        .bind(form.employee_count)
        .bind(&details)
        .bind(ApplicationStatus::Resubmitted.as_code())
        .execute(&mut *tx)
        .await?;

        if let Some(addresses) = &form.addresses {
            replace_addresses(&mut tx, application_id, addresses).await?;
        }
        if let Some(representatives) = &form.representatives {
            replace_representatives(&mut tx, application_id, representatives).await?;
        }
        if let Some(contact_persons) = &form.contact_persons {
            replace_contact_persons(&mut tx, application_id, contact_persons).await?;
        }
        if let Some(business_types) = &form.business_types {
            replace_business_types(&mut tx, application_id, business_types).await?;
        }
        if let Some(products) = &form.products {
            replace_products(&mut tx, application_id, products).await?;
        }
        if let Some(industry_groups) = &form.industry_groups {
            replace_industry_groups(&mut tx, application_id, industry_groups).await?;
        }
        if let Some(province_chapters) = &form.province_chapters {
            replace_province_chapters(&mut tx, application_id, province_chapters).await?;
        }
        if let Some(documents) = &form.documents {
            replace_documents(&mut tx, application_id, documents).await?;
        }

        tx.commit().await?;

        tracing::info!(%application_id, resubmission = row.resubmission_count + 1, "application resubmitted");

        // Confirmation email, best-effort after commit
        let email = form.email.as_deref().unwrap_or(&row.email);
        let company = form.company_name_th.as_deref().unwrap_or(&row.company_name_th);
        self.notifier.notify_resubmitted(email, company);

        Ok(())
    }

    // ========================================================================
    // Staff section edit
    // ========================================================================

    /// Replace one section of an application in place.
    ///
    /// `section` is either "main" or the name of a child collection; a
    /// child section payload replaces that table wholesale.
    pub async fn update_section(
        &self,
        member_type: MemberType,
        application_id: Uuid,
        section: &str,
        data: serde_json::Value,
    ) -> AppResult<()> {
        // The application must exist under this type
        let _ = fetch_application(&self.db, member_type, application_id).await?;

        let mut tx = self.db.begin().await?;

        match section {
            "main" => {
                let input: MainSectionInput = parse_section(data)?;
                if let Some(email) = &input.email {
                    validation::validate_email(email)
                        .map_err(|msg| invalid_field("email", msg))?;
                }
                if let Some(phone) = &input.phone {
                    validation::validate_thai_phone(phone)
                        .map_err(|msg| invalid_field("phone", msg))?;
                }
                if let Some(details) = &input.type_details {
                    if details.member_type() != member_type {
                        return Err(invalid_field(
                            "type_details",
                            "Type details do not match the application's member type",
                        ));
                    }
                }
                let details = input
                    .type_details
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(|e| {
                        AppError::Internal(format!("failed to serialize type details: {}", e))
                    })?;

                sqlx::query(
                    r#"
                    UPDATE applications SET
                        company_name_th = COALESCE($3, company_name_th),
                        company_name_en = COALESCE($4, company_name_en),
                        email = COALESCE($5, email),
                        phone = COALESCE($6, phone),
                        website = COALESCE($7, website),
                        registered_capital = COALESCE($8, registered_capital),
                        employee_count = COALESCE($9, employee_count),
                        type_details = COALESCE($10, type_details),
                        updated_at = NOW()
                    WHERE id = $1 AND member_type = $2
                    "#,
                )
                .bind(application_id)
                .bind(member_type.as_str())
                .bind(&input.company_name_th)
                .bind(&input.company_name_en)
                .bind(&input.email)
                .bind(&input.phone)
                .bind(&input.website)
                .bind(input.registered_capital)
                .bind(input.employee_count)
                .bind(&details)
                .execute(&mut *tx)
                .await?;
            }
            "addresses" => {
                let rows: Vec<AddressPayload> = parse_section(data)?;
                validation::validate_addresses(&rows)
                    .map_err(|msg| invalid_field("addresses", msg))?;
                replace_addresses(&mut tx, application_id, &rows).await?;
            }
            "representatives" => {
                let rows: Vec<RepresentativePayload> = parse_section(data)?;
                validation::validate_representatives(&rows)
                    .map_err(|msg| invalid_field("representatives", msg))?;
                replace_representatives(&mut tx, application_id, &rows).await?;
            }
            "contact_persons" => {
                let rows: Vec<ContactPersonPayload> = parse_section(data)?;
                replace_contact_persons(&mut tx, application_id, &rows).await?;
            }
            "business_types" => {
                let rows: Vec<BusinessTypePayload> = parse_section(data)?;
                replace_business_types(&mut tx, application_id, &rows).await?;
            }
            "products" => {
                let rows: Vec<ProductPayload> = parse_section(data)?;
                replace_products(&mut tx, application_id, &rows).await?;
            }
            "industry_groups" => {
                let rows: Vec<IndustryGroupPayload> = parse_section(data)?;
                replace_industry_groups(&mut tx, application_id, &rows).await?;
            }
            "province_chapters" => {
                let rows: Vec<ProvinceChapterPayload> = parse_section(data)?;
                replace_province_chapters(&mut tx, application_id, &rows).await?;
            }
            "documents" => {
                let rows: Vec<DocumentPayload> = parse_section(data)?;
                replace_documents(&mut tx, application_id, &rows).await?;
            }
            other => {
                return Err(AppError::Validation {
                    field: "section".to_string(),
                    message: format!("Unknown section: {}", other),
                    message_th: format!("ไม่รู้จักส่วนข้อมูล: {}", other),
                });
            }
        }

        sqlx::query("UPDATE applications SET updated_at = NOW() WHERE id = $1")
            .bind(application_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%application_id, section, "application section updated");

        Ok(())
    }
}

// ============================================================================
// Shared fetch helpers
// ============================================================================

/// Decode a stored status code, rejecting reserved values
pub(crate) fn decode_status(code: i16) -> AppResult<ApplicationStatus> {
    ApplicationStatus::from_code(code)
        .ok_or_else(|| AppError::Internal(format!("unknown application status code {}", code)))
}

/// Decode a stored member type tag
pub(crate) fn decode_member_type(tag: &str) -> AppResult<MemberType> {
    MemberType::from_str(tag)
        .ok_or_else(|| AppError::Internal(format!("unknown member type tag {}", tag)))
}

/// Decode the JSONB type-details payload
pub(crate) fn decode_details(value: serde_json::Value) -> AppResult<TypeDetails> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(format!("corrupt type details payload: {}", e)))
}

/// Fetch an application by id under a given member type
pub(crate) async fn fetch_application(
    db: &PgPool,
    member_type: MemberType,
    application_id: Uuid,
) -> AppResult<ApplicationRow> {
    sqlx::query_as::<_, ApplicationRow>(&format!(
        "SELECT {} FROM applications WHERE id = $1 AND member_type = $2",
        APPLICATION_COLUMNS
    ))
    .bind(application_id)
    .bind(member_type.as_str())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Application".to_string()))
}

/// All child collections of one application
pub(crate) struct ChildCollections {
    pub addresses: Vec<AddressRow>,
    pub representatives: Vec<RepresentativeRow>,
    pub contact_persons: Vec<ContactPersonRow>,
    pub business_types: Vec<BusinessTypeRow>,
    pub products: Vec<ProductRow>,
    pub industry_groups: Vec<IndustryGroupRow>,
    pub province_chapters: Vec<ProvinceChapterRow>,
    pub documents: Vec<DocumentRow>,
}

impl ChildCollections {
    fn into_detail<V>(self, application: V) -> ApplicationDetail<V> {
        ApplicationDetail {
            application,
            addresses: self.addresses,
            representatives: self.representatives,
            contact_persons: self.contact_persons,
            business_types: self.business_types,
            products: self.products,
            industry_groups: self.industry_groups,
            province_chapters: self.province_chapters,
            documents: self.documents,
        }
    }
}

/// Fetch every child collection for an application
pub(crate) async fn fetch_children(db: &PgPool, application_id: Uuid) -> AppResult<ChildCollections> {
    let addresses = sqlx::query_as::<_, AddressRow>(
        r#"
        SELECT id, application_id, address_type, address_line, subdistrict, district,
               province, postal_code, phone, fax, email
        FROM application_addresses
        WHERE application_id = $1
        ORDER BY address_type ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let representatives = sqlx::query_as::<_, RepresentativeRow>(
        r#"
        SELECT id, application_id, is_primary, title, first_name_th, last_name_th,
               first_name_en, last_name_en, position, phone, email, display_order
        FROM application_representatives
        WHERE application_id = $1
        ORDER BY display_order ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let contact_persons = sqlx::query_as::<_, ContactPersonRow>(
        r#"
        SELECT id, application_id, name, position, phone, email, line_id
        FROM application_contact_persons
        WHERE application_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let business_types = sqlx::query_as::<_, BusinessTypeRow>(
        r#"
        SELECT id, application_id, category_code, other_detail
        FROM application_business_types
        WHERE application_id = $1
        ORDER BY category_code ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let products = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, application_id, name_th, name_en
        FROM application_products
        WHERE application_id = $1
        ORDER BY name_th ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let industry_groups = sqlx::query_as::<_, IndustryGroupRow>(
        r#"
        SELECT id, application_id, group_code, group_name
        FROM application_industry_groups
        WHERE application_id = $1
        ORDER BY group_code ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let province_chapters = sqlx::query_as::<_, ProvinceChapterRow>(
        r#"
        SELECT id, application_id, chapter_code, chapter_name
        FROM application_province_chapters
        WHERE application_id = $1
        ORDER BY chapter_code ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let documents = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, application_id, document_type, file_name, file_url,
               file_size_bytes, mime_type, uploaded_at
        FROM application_documents
        WHERE application_id = $1
        ORDER BY uploaded_at DESC
        "#,
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    Ok(ChildCollections {
        addresses,
        representatives,
        contact_persons,
        business_types,
        products,
        industry_groups,
        province_chapters,
        documents,
    })
}

// ============================================================================
// Child collection replacement
// ============================================================================

pub(crate) async fn replace_addresses(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[AddressPayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_addresses WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_addresses (
                application_id, address_type, address_line, subdistrict, district,
                province, postal_code, phone, fax, email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(application_id)
        .bind(row.address_type.as_str())
        .bind(&row.address_line)
        .bind(&row.subdistrict)
        .bind(&row.district)
        .bind(&row.province)
        .bind(&row.postal_code)
        .bind(&row.phone)
        .bind(&row.fax)
        .bind(&row.email)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_representatives(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[RepresentativePayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_representatives WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_representatives (
                application_id, is_primary, title, first_name_th, last_name_th,
                first_name_en, last_name_en, position, phone, email, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(application_id)
        .bind(row.is_primary)
        .bind(&row.title)
        .bind(&row.first_name_th)
        .bind(&row.last_name_th)
        .bind(&row.first_name_en)
        .bind(&row.last_name_en)
        .bind(&row.position)
        .bind(&row.phone)
        .bind(&row.email)
        .bind(row.display_order)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_contact_persons(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[ContactPersonPayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_contact_persons WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_contact_persons (
                application_id, name, position, phone, email, line_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(application_id)
        .bind(&row.name)
        .bind(&row.position)
        .bind(&row.phone)
        .bind(&row.email)
        .bind(&row.line_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_business_types(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[BusinessTypePayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_business_types WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_business_types (application_id, category_code, other_detail)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(application_id)
        .bind(&row.category_code)
        .bind(&row.other_detail)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_products(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[ProductPayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_products WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_products (application_id, name_th, name_en)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(application_id)
        .bind(&row.name_th)
        .bind(&row.name_en)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_industry_groups(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[IndustryGroupPayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_industry_groups WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_industry_groups (application_id, group_code, group_name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(application_id)
        .bind(&row.group_code)
        .bind(&row.group_name)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_province_chapters(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[ProvinceChapterPayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_province_chapters WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_province_chapters (application_id, chapter_code, chapter_name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(application_id)
        .bind(&row.chapter_code)
        .bind(&row.chapter_name)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub(crate) async fn replace_documents(
    tx: &mut Transaction<'_, Postgres>,
    application_id: Uuid,
    rows: &[DocumentPayload],
) -> AppResult<()> {
    sqlx::query("DELETE FROM application_documents WHERE application_id = $1")
        .bind(application_id)
        .execute(&mut **tx)
        .await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO application_documents (
                application_id, document_type, file_name, file_url, file_size_bytes, mime_type
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(application_id)
        .bind(&row.document_type)
        .bind(&row.file_name)
        .bind(&row.file_url)
        .bind(row.file_size_bytes)
        .bind(&row.mime_type)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

fn invalid_field(field: &str, message: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
        message_th: format!("ข้อมูลไม่ถูกต้อง: {}", field),
    }
}

fn parse_section<T: serde::de::DeserializeOwned>(data: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(data)
        .map_err(|e| AppError::ValidationError(format!("Invalid section payload: {}", e)))
}

/// Validate a full submission payload
fn validate_form(member_type: MemberType, form: &ApplicationForm) -> AppResult<()> {
    if form.company_name_th.trim().is_empty() {
        return Err(AppError::Validation {
            field: "company_name_th".to_string(),
            message: "Company name (Thai) is required".to_string(),
            message_th: "กรุณาระบุชื่อบริษัทภาษาไทย".to_string(),
        });
    }

    validation::validate_email(&form.email).map_err(|msg| invalid_field("email", msg))?;
    validation::validate_thai_phone(&form.phone).map_err(|msg| invalid_field("phone", msg))?;

    // For individual applicants the identity number is the ID card number
    match member_type {
        MemberType::Ic => validation::validate_thai_national_id(&form.tax_id)
            .map_err(|msg| invalid_field("tax_id", msg))?,
        _ => validation::validate_thai_tax_id(&form.tax_id)
            .map_err(|msg| invalid_field("tax_id", msg))?,
    }

    if form.type_details.member_type() != member_type {
        return Err(AppError::Validation {
            field: "type_details".to_string(),
            message: "Type details do not match the requested member type".to_string(),
            message_th: "ข้อมูลเฉพาะประเภทไม่ตรงกับประเภทสมาชิกที่สมัคร".to_string(),
        });
    }

    validation::validate_addresses(&form.addresses)
        .map_err(|msg| invalid_field("addresses", msg))?;
    validation::validate_representatives(&form.representatives)
        .map_err(|msg| invalid_field("representatives", msg))?;

    for business_type in &form.business_types {
        if business_type.category_code == "other"
            && business_type
                .other_detail
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        {
            return Err(AppError::Validation {
                field: "business_types".to_string(),
                message: "Business type 'other' requires a detail".to_string(),
                message_th: "กรุณาระบุรายละเอียดประเภทธุรกิจอื่นๆ".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate a resubmission payload; only provided pieces are checked
fn validate_update(member_type: MemberType, form: &UpdateForm) -> AppResult<()> {
    if let Some(email) = &form.email {
        validation::validate_email(email).map_err(|msg| invalid_field("email", msg))?;
    }
    if let Some(phone) = &form.phone {
        validation::validate_thai_phone(phone).map_err(|msg| invalid_field("phone", msg))?;
    }
    if let Some(details) = &form.type_details {
        if details.member_type() != member_type {
            return Err(invalid_field(
                "type_details",
                "Type details do not match the application's member type",
            ));
        }
    }
    if let Some(addresses) = &form.addresses {
        validation::validate_addresses(addresses)
            .map_err(|msg| invalid_field("addresses", msg))?;
    }
    if let Some(representatives) = &form.representatives {
        validation::validate_representatives(representatives)
            .map_err(|msg| invalid_field("representatives", msg))?;
    }

    Ok(())
}
