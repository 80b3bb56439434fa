//! Records the pharmacy keeps per tenant.
//!
//! Every record carries `id`, `organizationId` and `createdDate`; the tenant
//! is always the caller's organization, never a client-supplied value.

use std::sync::LazyLock;

use rust_decimal::Decimal;
use rxkit::RequestError;
use rxkit_query::{FieldMap, SortValue};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::access::{Access, policies, roles};
use super::entity::{Entity, Stamp, contains_ci};
use super::validation::Violations;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

const READERS: [&str; 4] = [
    roles::ADMIN,
    roles::PHARMACIST,
    roles::TECHNICIAN,
    roles::NURSE,
];

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// A tenant's own profile, or an organization it deals with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub name: String,
    pub billing_email: Option<String>,
    pub fax_number: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewOrganization {
    pub name: String,
    #[serde(default)]
    pub billing_email: Option<String>,
    #[serde(default)]
    pub fax_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

static ORGANIZATION_FIELDS: LazyLock<FieldMap<Organization>> = LazyLock::new(|| {
    FieldMap::<Organization>::new()
        .insert("Name", |o| SortValue::from(&o.name))
        .insert("BillingEmail", |o| SortValue::from(o.billing_email.as_ref()))
        .insert("CreatedDate", |o| SortValue::from(o.created_date))
});

impl Entity for Organization {
    const COLLECTION: &'static str = "organizations";
    const LABEL: &'static str = "organization";
    type Input = NewOrganization;

    fn id(&self) -> Uuid {
        self.id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    fn fields() -> &'static FieldMap<Self> {
        &ORGANIZATION_FIELDS
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || self
                .billing_email
                .as_deref()
                .is_some_and(|email| contains_ci(email, needle))
    }

    fn access() -> Access {
        Access::new(&roles::ALL, &[roles::ADMIN])
    }

    fn create(input: NewOrganization, stamp: Stamp) -> Result<Self, RequestError> {
        let mut v = Violations::new();
        v.text("name", &input.name);
        if let Some(email) = &input.billing_email {
            v.email("billingEmail", email);
        }
        if let Some(fax) = &input.fax_number {
            v.fax("faxNumber", fax);
        }
        v.optional_text("phone", input.phone.as_deref());
        v.finish()?;

        Ok(Self {
            id: stamp.id,
            organization_id: stamp.organization_id,
            created_date: stamp.created_date,
            name: input.name.trim().to_owned(),
            billing_email: input.billing_email,
            fax_number: input.fax_number,
            phone: input.phone,
        })
    }
}

// ---------------------------------------------------------------------------
// Ward
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub name: String,
    pub floor: Option<i32>,
    pub bed_count: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewWard {
    pub name: String,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub bed_count: i32,
}

static WARD_FIELDS: LazyLock<FieldMap<Ward>> = LazyLock::new(|| {
    FieldMap::<Ward>::new()
        .insert("Name", |w| SortValue::from(&w.name))
        .insert("Floor", |w| SortValue::from(w.floor))
        .insert("BedCount", |w| SortValue::from(w.bed_count))
        .insert("CreatedDate", |w| SortValue::from(w.created_date))
});

impl Entity for Ward {
    const COLLECTION: &'static str = "wards";
    const LABEL: &'static str = "ward";
    type Input = NewWard;

    fn id(&self) -> Uuid {
        self.id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    fn fields() -> &'static FieldMap<Self> {
        &WARD_FIELDS
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
    }

    fn access() -> Access {
        Access::new(&READERS, &[roles::ADMIN])
    }

    fn create(input: NewWard, stamp: Stamp) -> Result<Self, RequestError> {
        let mut v = Violations::new();
        v.text("name", &input.name);
        v.check(input.bed_count >= 0, "bedCount", "must not be negative");
        v.finish()?;

        Ok(Self {
            id: stamp.id,
            organization_id: stamp.organization_id,
            created_date: stamp.created_date,
            name: input.name.trim().to_owned(),
            floor: input.floor,
            bed_count: input.bed_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Patient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub medical_record_number: String,
    pub ward_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub medical_record_number: String,
    #[serde(default)]
    pub ward_id: Option<Uuid>,
}

static PATIENT_FIELDS: LazyLock<FieldMap<Patient>> = LazyLock::new(|| {
    FieldMap::<Patient>::new()
        .insert("FirstName", |p| SortValue::from(&p.first_name))
        .insert("LastName", |p| SortValue::from(&p.last_name))
        .insert("DateOfBirth", |p| SortValue::from(p.date_of_birth))
        .insert("MedicalRecordNumber", |p| {
            SortValue::from(&p.medical_record_number)
        })
        .insert("CreatedDate", |p| SortValue::from(p.created_date))
});

impl Entity for Patient {
    const COLLECTION: &'static str = "patients";
    const LABEL: &'static str = "patient";
    type Input = NewPatient;

    fn id(&self) -> Uuid {
        self.id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    fn fields() -> &'static FieldMap<Self> {
        &PATIENT_FIELDS
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        contains_ci(&self.first_name, needle)
            || contains_ci(&self.last_name, needle)
            || contains_ci(&self.medical_record_number, needle)
    }

    fn access() -> Access {
        Access::new(&READERS, &[roles::ADMIN, roles::PHARMACIST, roles::NURSE])
    }

    fn create(input: NewPatient, stamp: Stamp) -> Result<Self, RequestError> {
        let mut v = Violations::new();
        v.text("firstName", &input.first_name);
        v.text("lastName", &input.last_name);
        v.text("medicalRecordNumber", &input.medical_record_number);
        if let Some(born) = input.date_of_birth {
            v.check(
                born <= stamp.created_date.date(),
                "dateOfBirth",
                "must not be in the future",
            );
        }
        v.finish()?;

        Ok(Self {
            id: stamp.id,
            organization_id: stamp.organization_id,
            created_date: stamp.created_date,
            first_name: input.first_name.trim().to_owned(),
            last_name: input.last_name.trim().to_owned(),
            date_of_birth: input.date_of_birth,
            medical_record_number: input.medical_record_number.trim().to_owned(),
            ward_id: input.ward_id,
        })
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Directory entry for a person who signs in. Role membership lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub user_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub user_type_id: i32,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl User {
    /// Role names compare case-insensitively
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    /// Defaults to a fresh id. Set it to match the identity provider's `sub`.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub user_type_id: i32,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

static USER_FIELDS: LazyLock<FieldMap<User>> = LazyLock::new(|| {
    FieldMap::<User>::new()
        .insert("UserName", |u| SortValue::from(&u.user_name))
        .insert("FirstName", |u| SortValue::from(u.first_name.as_ref()))
        .insert("LastName", |u| SortValue::from(u.last_name.as_ref()))
        .insert("Email", |u| SortValue::from(&u.email))
        .insert("UserTypeId", |u| SortValue::from(u.user_type_id))
        .insert("IsActive", |u| SortValue::from(u.is_active))
        .insert("CreatedDate", |u| SortValue::from(u.created_date))
});

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "user";
    type Input = NewUser;

    fn id(&self) -> Uuid {
        self.id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    fn fields() -> &'static FieldMap<Self> {
        &USER_FIELDS
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        contains_ci(&self.user_name, needle)
            || contains_ci(&self.email, needle)
            || [&self.first_name, &self.last_name]
                .into_iter()
                .flatten()
                .any(|name| contains_ci(name, needle))
    }

    fn access() -> Access {
        Access::new(&[roles::ADMIN], &[roles::ADMIN])
    }

    fn create(input: NewUser, stamp: Stamp) -> Result<Self, RequestError> {
        let mut v = Violations::new();
        v.text("userName", &input.user_name);
        v.email("email", &input.email);
        v.optional_text("firstName", input.first_name.as_deref());
        v.optional_text("lastName", input.last_name.as_deref());
        for role in &input.roles {
            v.check(
                roles::ALL.iter().any(|known| known.eq_ignore_ascii_case(role)),
                "roles",
                &format!("unknown role `{role}`"),
            );
        }
        v.finish()?;

        Ok(Self {
            id: input.id.unwrap_or(stamp.id),
            organization_id: stamp.organization_id,
            created_date: stamp.created_date,
            user_name: input.user_name.trim().to_owned(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email.trim().to_owned(),
            user_type_id: input.user_type_id,
            roles: input.roles,
            is_active: input.is_active,
        })
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Metadata of a stored file. The bytes live outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub title: String,
    pub file_name: String,
    pub content_type: String,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewDocument {
    pub title: String,
    pub file_name: String,
    #[serde(default = "octet_stream")]
    pub content_type: String,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
}

fn octet_stream() -> String {
    "application/octet-stream".to_owned()
}

static DOCUMENT_FIELDS: LazyLock<FieldMap<Document>> = LazyLock::new(|| {
    FieldMap::<Document>::new()
        .insert("Title", |d| SortValue::from(&d.title))
        .insert("FileName", |d| SortValue::from(&d.file_name))
        .insert("ContentType", |d| SortValue::from(&d.content_type))
        .insert("CreatedDate", |d| SortValue::from(d.created_date))
});

impl Entity for Document {
    const COLLECTION: &'static str = "documents";
    const LABEL: &'static str = "document";
    type Input = NewDocument;

    fn id(&self) -> Uuid {
        self.id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    fn fields() -> &'static FieldMap<Self> {
        &DOCUMENT_FIELDS
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        contains_ci(&self.title, needle) || contains_ci(&self.file_name, needle)
    }

    fn access() -> Access {
        Access::new(
            &READERS,
            &[roles::ADMIN, roles::PHARMACIST, roles::TECHNICIAN],
        )
    }

    fn create(input: NewDocument, stamp: Stamp) -> Result<Self, RequestError> {
        let mut v = Violations::new();
        v.text("title", &input.title);
        v.text("fileName", &input.file_name);
        v.check(
            input.content_type.contains('/'),
            "contentType",
            "must be a media type",
        );
        v.finish()?;

        Ok(Self {
            id: stamp.id,
            organization_id: stamp.organization_id,
            created_date: stamp.created_date,
            title: input.title.trim().to_owned(),
            file_name: input.file_name.trim().to_owned(),
            content_type: input.content_type,
            patient_id: input.patient_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Invoice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub number: String,
    pub amount: Decimal,
    #[serde(with = "iso_date::option")]
    pub due_date: Option<Date>,
    pub is_paid: bool,
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewInvoice {
    pub number: String,
    pub amount: Decimal,
    #[serde(default, with = "iso_date::option")]
    pub due_date: Option<Date>,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
}

static INVOICE_FIELDS: LazyLock<FieldMap<Invoice>> = LazyLock::new(|| {
    FieldMap::<Invoice>::new()
        .insert("Number", |i| SortValue::from(&i.number))
        .insert("Amount", |i| SortValue::from(i.amount))
        .insert("DueDate", |i| SortValue::from(i.due_date))
        .insert("IsPaid", |i| SortValue::from(i.is_paid))
        .insert("CreatedDate", |i| SortValue::from(i.created_date))
});

impl Entity for Invoice {
    const COLLECTION: &'static str = "invoices";
    const LABEL: &'static str = "invoice";
    type Input = NewInvoice;

    fn id(&self) -> Uuid {
        self.id
    }

    fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    fn created_date(&self) -> OffsetDateTime {
        self.created_date
    }

    fn fields() -> &'static FieldMap<Self> {
        &INVOICE_FIELDS
    }

    fn matches_keyword(&self, needle: &str) -> bool {
        contains_ci(&self.number, needle)
    }

    fn access() -> Access {
        Access::new(&[roles::ADMIN, roles::BILLING], &[roles::ADMIN, roles::BILLING])
            .with_write_policy(policies::MANAGE_BILLING)
    }

    fn create(input: NewInvoice, stamp: Stamp) -> Result<Self, RequestError> {
        let mut v = Violations::new();
        v.text("number", &input.number);
        v.check(
            input.amount > Decimal::ZERO,
            "amount",
            "must be greater than zero",
        );
        v.finish()?;

        Ok(Self {
            id: stamp.id,
            organization_id: stamp.organization_id,
            created_date: stamp.created_date,
            number: input.number.trim().to_owned(),
            amount: input.amount,
            due_date: input.due_date,
            is_paid: false,
            patient_id: input.patient_id,
        })
    }
}
