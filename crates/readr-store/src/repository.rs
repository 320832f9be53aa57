//! The record data-access façade.
//!
//! [`Repository<R>`] runs create / update / delete / get for one record type
//! over any [`GenericClient`]: a plain connection, a pooled one, or a
//! transaction. It holds no connection itself. See [`Store`](crate::Store)
//! for the pool-backed variant.

use crate::client::GenericClient;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::field::FieldDescriptor;
use crate::nullable::NullInt;
use crate::record::Record;
use crate::statement::{
    StatementMode, StatementTemplate, TemplateCache, TemplateKey, plan, require_set, select_key,
};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Which update statement [`Repository::update_with`] issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Write only the fields the presence policy selects.
    #[default]
    Partial,
    /// Overwrite every non-identity column.
    Full,
}

impl From<UpdateMode> for StatementMode {
    fn from(mode: UpdateMode) -> Self {
        match mode {
            UpdateMode::Partial => StatementMode::PartialUpdate,
            UpdateMode::Full => StatementMode::FullUpdate,
        }
    }
}

/// Typed outcomes for one record type.
///
/// ```ignore
/// let repo = Repository::<Member>::new(StoreConfig::new())?
///     .with_deleted_code(status.member(Status::Deleted));
///
/// repo.create(&client, &member).await?;
/// let found = repo.get(&client, &member.id).await?;
/// repo.delete(&client, &member.id).await?;
/// ```
pub struct Repository<R> {
    config: StoreConfig,
    cache: Option<Arc<TemplateCache>>,
    deleted_code: Option<i64>,
    _record: PhantomData<fn() -> R>,
}

impl<R> std::fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("record", &std::any::type_name::<R>())
            .field("config", &self.config)
            .field("deleted_code", &self.deleted_code)
            .finish()
    }
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            cache: self.cache.clone(),
            deleted_code: self.deleted_code,
            _record: PhantomData,
        }
    }
}

impl<R: Record> Repository<R> {
    /// Build a repository, validating `R`'s schema up front.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        R::schema().validate()?;
        let cache = config
            .template_cache
            .then(|| Arc::new(TemplateCache::default()));
        Ok(Self {
            config,
            cache,
            deleted_code: None,
            _record: PhantomData,
        })
    }

    /// Status code written by [`Repository::delete`].
    pub fn with_deleted_code(mut self, code: i64) -> Self {
        self.deleted_code = Some(code);
        self
    }

    /// Share a template cache with other repositories.
    pub fn with_cache(mut self, cache: Arc<TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Plan and render the statement `mode` would run for these descriptors.
    pub fn statement(
        &self,
        mode: StatementMode,
        descriptors: &[FieldDescriptor<'_>],
    ) -> StoreResult<Arc<StatementTemplate>> {
        let key = plan(R::table(), mode, descriptors, self.config.text_presence)?;
        Ok(self.render(key))
    }

    /// Insert `record`, every column included.
    pub async fn create<C: GenericClient>(&self, client: &C, record: &R) -> StoreResult<()> {
        let fields = record.describe_fields();
        let template = self.statement(StatementMode::Insert, &fields)?;
        self.execute(client, &template, &fields).await?;
        Ok(())
    }

    /// Partial update of `record`.
    pub async fn update<C: GenericClient>(&self, client: &C, record: &R) -> StoreResult<()> {
        self.update_with(client, record, UpdateMode::Partial).await
    }

    /// Update `record`; exactly one row must match its identity.
    pub async fn update_with<C: GenericClient>(
        &self,
        client: &C,
        record: &R,
        mode: UpdateMode,
    ) -> StoreResult<()> {
        let fields = record.describe_fields();
        let template = self.statement(mode.into(), &fields)?;
        require_set(&template)?;
        let affected = self.execute(client, &template, &fields).await?;
        expect_single_row(&template, affected)
    }

    /// Soft delete: set the status column to the deleted code.
    pub async fn delete<C: GenericClient>(&self, client: &C, id: &R::Id) -> StoreResult<()> {
        let schema = R::schema();
        let status_column = schema.status_column.ok_or_else(|| {
            StoreError::schema(format!("{}: no status column for soft delete", schema.table))
        })?;
        let code = self.deleted_code.ok_or_else(|| {
            StoreError::schema(format!("{}: no deleted status code configured", schema.table))
        })?;

        let status = NullInt::of(code);
        let fields = [
            FieldDescriptor::field(status_column, &status),
            FieldDescriptor::identity(schema.identity()?.name, id),
        ];
        let template = self.statement(StatementMode::PartialUpdate, &fields)?;
        let affected = self.execute(client, &template, &fields).await?;
        expect_single_row(&template, affected)
    }

    /// Fetch the row whose identity equals `id`.
    pub async fn get<C: GenericClient>(&self, client: &C, id: &R::Id) -> StoreResult<R> {
        let schema = R::schema();
        let key = select_key(schema)?;
        let identity = schema.identity()?.name;
        let template = self.render(key);
        let fields = [FieldDescriptor::identity(identity, id)];
        let bound = template.bind(&fields)?;
        trace_statement(&template, bound.params.len());

        let row = self
            .bounded(client.query_opt(bound.sql, bound.params()))
            .await?
            .ok_or_else(|| {
                StoreError::not_found(format!("{}: no row with {identity} = {id:?}", schema.table))
            })?;
        // A column that fails to decode drops the whole record.
        R::from_row(&row)
    }

    async fn execute<C: GenericClient>(
        &self,
        client: &C,
        template: &StatementTemplate,
        fields: &[FieldDescriptor<'_>],
    ) -> StoreResult<u64> {
        let bound = template.bind(fields)?;
        trace_statement(template, bound.params.len());
        self.bounded(client.execute(bound.sql, bound.params())).await
    }

    /// Run `fut` under the configured timeout.
    pub(crate) async fn bounded<T>(
        &self,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match self.config.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| StoreError::timeout(limit))?,
            None => fut.await,
        }
    }

    fn render(&self, key: TemplateKey) -> Arc<StatementTemplate> {
        match &self.cache {
            Some(cache) => cache.get_or_render(key),
            None => Arc::new(StatementTemplate::from_key(key)),
        }
    }
}

fn trace_statement(template: &StatementTemplate, params: usize) {
    tracing::debug!(
        target: "readr_store::sql",
        table = template.table(),
        mode = template.mode().as_str(),
        sql = template.sql(),
        params,
        "executing statement"
    );
}

fn expect_single_row(template: &StatementTemplate, affected: u64) -> StoreResult<()> {
    match affected {
        0 => Err(StoreError::not_found(format!(
            "{}: no row matched {}",
            template.table(),
            template.identity().unwrap_or("identity")
        ))),
        1 => Ok(()),
        n => {
            tracing::warn!(
                target: "readr_store::sql",
                table = template.table(),
                mode = template.mode().as_str(),
                affected = n,
                "identity predicate matched more than one row"
            );
            Err(StoreError::IntegrityViolation {
                table: template.table().to_string(),
                affected: n,
            })
        }
    }
}
