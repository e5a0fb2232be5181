//! Database service for tax-service.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration as StdDuration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    ExpenseRecord, InvoiceRecord, NewTaxConfiguration, NewTaxReturn, PaymentRecord,
    TaxConfiguration, TaxReturn, TaxType, UpdateTaxReturn,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::TaxStore;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "tax-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(StdDuration::from_secs(30))
            .idle_timeout(StdDuration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl TaxStore for Database {
    // -------------------------------------------------------------------------
    // Tax Configuration Operations
    // -------------------------------------------------------------------------

    /// Resolve the configuration in effect today by effective-date range.
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn active_tax_configuration(
        &self,
        user_id: Uuid,
        country_code: &str,
        tax_type: TaxType,
    ) -> Result<Option<TaxConfiguration>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["active_tax_configuration"])
            .start_timer();

        let today = Utc::now().date_naive();
        let config = sqlx::query_as::<_, TaxConfiguration>(
            r#"
            SELECT tax_config_id, user_id, country_code, tax_type, name, rate,
                applies_to_goods, applies_to_services, effective_from, effective_to,
                active, created_utc
            FROM tax_configurations
            WHERE user_id = $1
              AND country_code = $2
              AND tax_type = $3
              AND active = TRUE
              AND effective_from <= $4
              AND (effective_to IS NULL OR effective_to >= $4)
            ORDER BY effective_from DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(country_code)
        .bind(tax_type.as_str())
        .bind(today)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get tax configuration: {}", e))
        })?;

        timer.observe_duration();

        Ok(config)
    }

    /// Supersede any active configuration and insert the new one atomically.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create_tax_configuration(
        &self,
        input: NewTaxConfiguration,
    ) -> Result<TaxConfiguration, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_tax_configuration"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        // The old rate stops the day before the new one starts.
        sqlx::query(
            r#"
            UPDATE tax_configurations
            SET active = FALSE,
                effective_to = COALESCE(effective_to, $4)
            WHERE user_id = $1 AND country_code = $2 AND tax_type = $3 AND active = TRUE
            "#,
        )
        .bind(input.user_id)
        .bind(&input.country_code)
        .bind(&input.tax_type)
        .bind(input.effective_from - Duration::days(1))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to supersede configuration: {}", e))
        })?;

        let tax_config_id = Uuid::new_v4();
        let config = sqlx::query_as::<_, TaxConfiguration>(
            r#"
            INSERT INTO tax_configurations (
                tax_config_id, user_id, country_code, tax_type, name, rate,
                applies_to_goods, applies_to_services, effective_from, effective_to, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
            RETURNING tax_config_id, user_id, country_code, tax_type, name, rate,
                applies_to_goods, applies_to_services, effective_from, effective_to,
                active, created_utc
            "#,
        )
        .bind(tax_config_id)
        .bind(input.user_id)
        .bind(&input.country_code)
        .bind(&input.tax_type)
        .bind(&input.name)
        .bind(input.rate)
        .bind(input.applies_to_goods)
        .bind(input.applies_to_services)
        .bind(input.effective_from)
        .bind(input.effective_to)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create tax configuration: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            tax_config_id = %config.tax_config_id,
            rate = %config.rate,
            "Tax configuration created"
        );

        Ok(config)
    }

    // -------------------------------------------------------------------------
    // Period Record Operations
    // -------------------------------------------------------------------------

    /// Get invoices issued within a period.
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn invoices_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InvoiceRecord>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoices_by_period"])
            .start_timer();

        let invoices = sqlx::query_as::<_, InvoiceRecord>(
            r#"
            SELECT invoice_id, user_id, total, balance_due, status, taxable,
                tax_inclusive, tax_amount, issue_date, created_utc
            FROM invoices
            WHERE user_id = $1
              AND issue_date >= $2
              AND issue_date <= $3
            ORDER BY issue_date, invoice_id
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Get expenses recorded within a period.
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn expenses_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["expenses_by_period"])
            .start_timer();

        let expenses = sqlx::query_as::<_, ExpenseRecord>(
            r#"
            SELECT expense_id, user_id, amount, category, tax_inclusive,
                expense_date, description, created_utc
            FROM expenses
            WHERE user_id = $1
              AND expense_date >= $2
              AND expense_date <= $3
            ORDER BY expense_date, expense_id
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get expenses: {}", e)))?;

        timer.observe_duration();

        Ok(expenses)
    }

    /// Get payments received within a period.
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn payments_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["payments_by_period"])
            .start_timer();

        let payments = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT payment_id, user_id, invoice_id, amount, method, status,
                payment_date, created_utc
            FROM payments
            WHERE user_id = $1
              AND payment_date >= $2
              AND payment_date <= $3
            ORDER BY payment_date, payment_id
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get payments: {}", e)))?;

        timer.observe_duration();

        Ok(payments)
    }

    // -------------------------------------------------------------------------
    // Tax Return Operations
    // -------------------------------------------------------------------------

    /// Persist a fully assembled draft return.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create_tax_return(&self, input: NewTaxReturn) -> Result<TaxReturn, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_tax_return"])
            .start_timer();

        let tax_return_id = Uuid::new_v4();
        let tax_return = sqlx::query_as::<_, TaxReturn>(
            r#"
            INSERT INTO tax_returns (
                tax_return_id, user_id, period_start, period_end, return_type,
                total_sales, total_purchases, gst_on_sales, gst_on_purchases,
                net_gst, status, return_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'draft', $11)
            RETURNING tax_return_id, user_id, period_start, period_end, return_type,
                total_sales, total_purchases, gst_on_sales, gst_on_purchases, net_gst,
                status, return_data, ird_reference, submitted_utc, created_utc
            "#,
        )
        .bind(tax_return_id)
        .bind(input.user_id)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(&input.return_type)
        .bind(input.total_sales)
        .bind(input.total_purchases)
        .bind(input.gst_on_sales)
        .bind(input.gst_on_purchases)
        .bind(input.net_gst)
        .bind(&input.return_data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create tax return: {}", e))
        })?;

        timer.observe_duration();

        info!(tax_return_id = %tax_return.tax_return_id, "Draft tax return created");

        Ok(tax_return)
    }

    /// Get a tax return by ID.
    #[instrument(skip(self), fields(tax_return_id = %tax_return_id))]
    async fn get_tax_return(&self, tax_return_id: Uuid) -> Result<Option<TaxReturn>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_tax_return"])
            .start_timer();

        let tax_return = sqlx::query_as::<_, TaxReturn>(
            r#"
            SELECT tax_return_id, user_id, period_start, period_end, return_type,
                total_sales, total_purchases, gst_on_sales, gst_on_purchases, net_gst,
                status, return_data, ird_reference, submitted_utc, created_utc
            FROM tax_returns
            WHERE tax_return_id = $1
            "#,
        )
        .bind(tax_return_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get tax return: {}", e)))?;

        timer.observe_duration();

        Ok(tax_return)
    }

    /// Patch a draft tax return.
    #[instrument(skip(self, input), fields(tax_return_id = %tax_return_id))]
    async fn update_tax_return(
        &self,
        tax_return_id: Uuid,
        input: UpdateTaxReturn,
    ) -> Result<Option<TaxReturn>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_tax_return"])
            .start_timer();

        // First check the return is still a draft.
        let existing = self.get_tax_return(tax_return_id).await?;
        match existing {
            Some(ref ret) if ret.is_draft() => {}
            Some(_) => {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Only draft tax returns can be updated"
                )))
            }
            None => return Ok(None),
        };

        let tax_return = sqlx::query_as::<_, TaxReturn>(
            r#"
            UPDATE tax_returns
            SET total_sales = COALESCE($2, total_sales),
                total_purchases = COALESCE($3, total_purchases),
                gst_on_sales = COALESCE($4, gst_on_sales),
                gst_on_purchases = COALESCE($5, gst_on_purchases),
                net_gst = COALESCE($6, net_gst),
                return_data = COALESCE($7, return_data)
            WHERE tax_return_id = $1 AND status = 'draft'
            RETURNING tax_return_id, user_id, period_start, period_end, return_type,
                total_sales, total_purchases, gst_on_sales, gst_on_purchases, net_gst,
                status, return_data, ird_reference, submitted_utc, created_utc
            "#,
        )
        .bind(tax_return_id)
        .bind(input.total_sales)
        .bind(input.total_purchases)
        .bind(input.gst_on_sales)
        .bind(input.gst_on_purchases)
        .bind(input.net_gst)
        .bind(input.return_data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update tax return: {}", e))
        })?;

        timer.observe_duration();

        Ok(tax_return)
    }

    /// Flip a draft to submitted in one conditional write.
    #[instrument(skip(self), fields(tax_return_id = %tax_return_id))]
    async fn mark_submitted(
        &self,
        tax_return_id: Uuid,
        ird_reference: &str,
        submitted_utc: DateTime<Utc>,
    ) -> Result<Option<TaxReturn>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_submitted"])
            .start_timer();

        let tax_return = sqlx::query_as::<_, TaxReturn>(
            r#"
            UPDATE tax_returns
            SET status = 'submitted',
                ird_reference = $2,
                submitted_utc = $3
            WHERE tax_return_id = $1 AND status = 'draft'
            RETURNING tax_return_id, user_id, period_start, period_end, return_type,
                total_sales, total_purchases, gst_on_sales, gst_on_purchases, net_gst,
                status, return_data, ird_reference, submitted_utc, created_utc
            "#,
        )
        .bind(tax_return_id)
        .bind(ird_reference)
        .bind(submitted_utc)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to submit tax return: {}", e))
        })?;

        timer.observe_duration();

        if let Some(ref ret) = tax_return {
            info!(
                tax_return_id = %ret.tax_return_id,
                ird_reference = %ird_reference,
                "Tax return submitted"
            );
        }

        Ok(tax_return)
    }

    /// Delete a draft tax return.
    #[instrument(skip(self), fields(tax_return_id = %tax_return_id))]
    async fn delete_draft(&self, tax_return_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_draft"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM tax_returns
            WHERE tax_return_id = $1 AND status = 'draft'
            "#,
        )
        .bind(tax_return_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to delete tax return: {}", e))
        })?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(tax_return_id = %tax_return_id, "Draft tax return deleted");
        }

        Ok(deleted)
    }
}
