//! Wiring of the pharmacy module: storage, identity, handlers and routes.

use std::sync::Arc;

use axum::Router;
use rxkit::config::module_config_or_default;
use rxkit::{CancellationToken, ConfigProvider, HandlerRegistry, Mediator, TaskQueue};
use time::OffsetDateTime;

use crate::api::rest::{self, ApiState};
use crate::config::{BootstrapConfig, PharmacyConfig};
use crate::domain::access::roles;
use crate::domain::entity::{Entity, Stamp};
use crate::domain::handlers::EntityHandler;
use crate::domain::identity::DirectoryIdentityService;
use crate::domain::model::{
    Document, Invoice, NewOrganization, NewUser, Organization, Patient, User, Ward,
};
use crate::domain::notify::{
    InvoiceMailer, LoggingSender, NotificationSender, Notifier, SendNotification,
    SendNotificationHandler,
};
use crate::domain::repo::Repository;
use crate::domain::tenant::Membership;
use crate::domain::requests::{CreateEntity, DeleteEntity, GetEntity, ListEntities};
use crate::infra::InMemoryRepository;

/// One store per collection
#[derive(Debug, Default)]
pub struct Repositories {
    pub organizations: Arc<InMemoryRepository<Organization>>,
    pub wards: Arc<InMemoryRepository<Ward>>,
    pub patients: Arc<InMemoryRepository<Patient>>,
    pub users: Arc<InMemoryRepository<User>>,
    pub documents: Arc<InMemoryRepository<Document>>,
    pub invoices: Arc<InMemoryRepository<Invoice>>,
}

pub struct PharmacyModule {
    config: PharmacyConfig,
    repos: Repositories,
    mediator: Mediator,
}

impl PharmacyModule {
    pub const NAME: &'static str = "pharmacy";

    /// Build from the `modules.pharmacy` section, falling back to defaults.
    ///
    /// # Errors
    /// The section exists but does not parse.
    pub fn from_provider(provider: &dyn ConfigProvider, queue: TaskQueue) -> anyhow::Result<Self> {
        let config: PharmacyConfig = module_config_or_default(provider, Self::NAME)?;
        let sender = Arc::new(LoggingSender::new(config.notifications.from_address.clone()));
        Ok(Self::new(config, queue, sender))
    }

    #[must_use]
    pub fn new(config: PharmacyConfig, queue: TaskQueue, sender: Arc<dyn NotificationSender>) -> Self {
        let repos = Repositories::default();
        let users: Arc<dyn Repository<User>> = repos.users.clone();
        let membership = Arc::new(Membership::new(users.clone()));
        let identity = DirectoryIdentityService::new(users, config.policies.clone());
        let mediator = Mediator::new(Arc::new(HandlerRegistry::new()), Arc::new(identity));

        let notifier = Arc::new(Notifier::new(queue, sender, &config.notifications));
        let organizations: Arc<dyn Repository<Organization>> = repos.organizations.clone();
        let mailer = Arc::new(InvoiceMailer::new(organizations, Arc::clone(&notifier)));

        let limits = &config.query;
        register_entity(
            &mediator,
            EntityHandler::<Organization>::new(
                repos.organizations.clone(),
                limits.clone(),
                membership.clone(),
            ),
        );
        register_entity(
            &mediator,
            EntityHandler::<Ward>::new(
                repos.wards.clone(),
                limits.clone(),
                membership.clone(),
            ),
        );
        register_entity(
            &mediator,
            EntityHandler::<Patient>::new(
                repos.patients.clone(),
                limits.clone(),
                membership.clone(),
            ),
        );
        register_entity(
            &mediator,
            EntityHandler::<User>::new(
                repos.users.clone(),
                limits.clone(),
                membership.clone(),
            ),
        );
        register_entity(
            &mediator,
            EntityHandler::<Document>::new(
                repos.documents.clone(),
                limits.clone(),
                membership.clone(),
            ),
        );
        register_entity(
            &mediator,
            EntityHandler::<Invoice>::new(
                repos.invoices.clone(),
                limits.clone(),
                membership.clone(),
            ).with_hook(mailer),
        );
        mediator.register::<SendNotification>(Arc::new(SendNotificationHandler::new(
            notifier, membership,
        )));

        tracing::info!(handlers = mediator.registry().len(), "pharmacy module initialized");
        Self {
            config,
            repos,
            mediator,
        }
    }

    /// Seed the configured tenant and administrator. Rows that already exist
    /// are left alone.
    ///
    /// # Errors
    /// Invalid seed data or a storage failure.
    #[tracing::instrument(skip(self), fields(module = "pharmacy"))]
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        let Some(seed) = &self.config.bootstrap else {
            return Ok(());
        };
        self.seed_organization(seed).await?;
        self.seed_admin(seed).await
    }

    async fn seed_organization(&self, seed: &BootstrapConfig) -> anyhow::Result<()> {
        if self.repos.organizations.get(seed.organization_id).await?.is_some() {
            tracing::debug!(organization_id = %seed.organization_id, "tenant already present");
            return Ok(());
        }
        let stamp = Stamp {
            id: seed.organization_id,
            organization_id: seed.organization_id,
            created_date: OffsetDateTime::now_utc(),
        };
        let input = NewOrganization {
            name: seed.organization_name.clone(),
            billing_email: seed.billing_email.clone(),
            ..NewOrganization::default()
        };
        let organization = Organization::create(input, stamp)?;
        self.repos.organizations.insert(organization).await?;
        tracing::info!(organization_id = %seed.organization_id, "tenant seeded");
        Ok(())
    }

    async fn seed_admin(&self, seed: &BootstrapConfig) -> anyhow::Result<()> {
        if self.repos.users.get(seed.admin_id).await?.is_some() {
            tracing::debug!(user_id = %seed.admin_id, "administrator already present");
            return Ok(());
        }
        let input = NewUser {
            id: Some(seed.admin_id),
            user_name: seed.admin_user_name.clone(),
            first_name: None,
            last_name: None,
            email: seed.admin_email.clone(),
            user_type_id: 0,
            roles: vec![roles::ADMIN.to_owned()],
            is_active: true,
        };
        let admin = User::create(input, Stamp::new(seed.organization_id))?;
        self.repos.users.insert(admin).await?;
        tracing::info!(user_id = %seed.admin_id, "administrator seeded");
        Ok(())
    }

    #[must_use]
    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    #[must_use]
    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    #[must_use]
    pub fn config(&self) -> &PharmacyConfig {
        &self.config
    }

    /// REST routes, without authentication. Cancelling `shutdown` cancels
    /// every request still in flight.
    #[must_use]
    pub fn router(&self, shutdown: CancellationToken) -> Router {
        rest::router(ApiState {
            mediator: self.mediator.clone(),
            shutdown,
        })
    }
}

fn register_entity<E: Entity>(mediator: &Mediator, handler: EntityHandler<E>) {
    let handler = Arc::new(handler);
    mediator.register::<ListEntities<E>>(handler.clone());
    mediator.register::<GetEntity<E>>(handler.clone());
    mediator.register::<CreateEntity<E>>(handler.clone());
    mediator.register::<DeleteEntity<E>>(handler);
    tracing::debug!(collection = E::COLLECTION, "entity handlers registered");
}
