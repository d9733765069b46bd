use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use common::{BranchId, CustomerId, ProductId, SaleId, SaleItemId, Version};
use domain::{BranchRef, CustomerRef, Money, Sale, SaleItem, SaleParts};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{DateRange, Result, SaleStore, StoreError};

const SALE_COLUMNS: &str = "id, version, sale_number, sale_date, customer_id, customer_name, \
     branch_id, branch_name, is_cancelled, total_amount";

/// PostgreSQL-backed sale store implementation.
///
/// A sale is one row in `sales` plus its lines in `sale_items`, kept in
/// line order by `position`. Updates compare-and-swap on `version` inside a
/// transaction and rewrite every line.
#[derive(Clone)]
pub struct PostgresSaleStore {
    pool: PgPool,
}

impl PostgresSaleStore {
    /// Creates a new PostgreSQL sale store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_parts(row: &PgRow) -> Result<SaleParts> {
        Ok(SaleParts {
            id: SaleId::from_uuid(row.try_get::<Uuid, _>("id")?),
            version: Version::new(row.try_get("version")?),
            sale_number: row.try_get("sale_number")?,
            sale_date: row.try_get("sale_date")?,
            customer: CustomerRef::new(
                CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
                row.try_get::<String, _>("customer_name")?,
            ),
            branch: BranchRef::new(
                BranchId::from_uuid(row.try_get::<Uuid, _>("branch_id")?),
                row.try_get::<String, _>("branch_name")?,
            ),
            is_cancelled: row.try_get("is_cancelled")?,
            total_amount: Money::from_cents(row.try_get("total_amount")?),
            items: Vec::new(),
        })
    }

    fn row_to_item(row: &PgRow) -> Result<SaleItem> {
        let quantity: i32 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|_| StoreError::Corrupt(format!("negative quantity {quantity}")))?;

        Ok(SaleItem {
            id: SaleItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            quantity,
            unit_price: Money::from_cents(row.try_get("unit_price")?),
            discount: Money::from_cents(row.try_get("discount")?),
            total_amount: Money::from_cents(row.try_get("total_amount")?),
        })
    }

    /// Attaches lines to the given sale rows, preserving row order.
    async fn hydrate(&self, rows: Vec<PgRow>) -> Result<Vec<Sale>> {
        let mut parts = rows
            .iter()
            .map(Self::row_to_parts)
            .collect::<Result<Vec<_>>>()?;
        if parts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = parts.iter().map(|p| p.id.as_uuid()).collect();
        let item_rows = sqlx::query(
            r#"
            SELECT id, sale_id, product_id, product_name, quantity, unit_price, discount, total_amount
            FROM sale_items
            WHERE sale_id = ANY($1)
            ORDER BY sale_id, position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for row in &item_rows {
            let sale_id: Uuid = row.try_get("sale_id")?;
            items.entry(sale_id).or_default().push(Self::row_to_item(row)?);
        }

        for part in &mut parts {
            part.items = items.remove(&part.id.as_uuid()).unwrap_or_default();
        }

        Ok(parts.into_iter().map(Sale::from_parts).collect())
    }

    async fn fetch_one(&self, rows: Vec<PgRow>) -> Result<Option<Sale>> {
        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn insert_items(conn: &mut PgConnection, sale: &Sale) -> Result<()> {
        for (position, item) in sale.items().iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Corrupt(format!("too many lines on {}", sale.id())))?;
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| StoreError::Corrupt(format!("quantity {} out of range", item.quantity)))?;

            sqlx::query(
                r#"
                INSERT INTO sale_items (id, sale_id, position, product_id, product_name, quantity, unit_price, discount, total_amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(sale.id().as_uuid())
            .bind(position)
            .bind(item.product_id.as_uuid())
            .bind(&item.product_name)
            .bind(quantity)
            .bind(item.unit_price.cents())
            .bind(item.discount.cents())
            .bind(item.total_amount.cents())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn write_new(conn: &mut PgConnection, sale: &Sale) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sales (id, version, sale_number, sale_date, customer_id, customer_name, branch_id, branch_name, is_cancelled, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(sale.id().as_uuid())
        .bind(sale.version().as_i64())
        .bind(sale.sale_number())
        .bind(sale.sale_date())
        .bind(sale.customer().id.as_uuid())
        .bind(&sale.customer().name)
        .bind(sale.branch().id.as_uuid())
        .bind(&sale.branch().name)
        .bind(sale.is_cancelled())
        .bind(sale.total_amount().cents())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, sale))?;

        Self::insert_items(conn, sale).await
    }

    /// Swaps the header at the expected version and rewrites the lines.
    /// Returns the new version.
    async fn write_update(conn: &mut PgConnection, sale: &Sale) -> Result<Version> {
        let new_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE sales
            SET version = version + 1,
                sale_number = $3,
                sale_date = $4,
                customer_id = $5,
                customer_name = $6,
                branch_id = $7,
                branch_name = $8,
                is_cancelled = $9,
                total_amount = $10,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING version
            "#,
        )
        .bind(sale.id().as_uuid())
        .bind(sale.version().as_i64())
        .bind(sale.sale_number())
        .bind(sale.sale_date())
        .bind(sale.customer().id.as_uuid())
        .bind(&sale.customer().name)
        .bind(sale.branch().id.as_uuid())
        .bind(&sale.branch().name)
        .bind(sale.is_cancelled())
        .bind(sale.total_amount().cents())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, sale))?;

        let Some(new_version) = new_version else {
            let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM sales WHERE id = $1")
                .bind(sale.id().as_uuid())
                .fetch_optional(&mut *conn)
                .await?;

            return Err(match actual {
                Some(actual) => StoreError::ConcurrencyConflict {
                    sale_id: sale.id(),
                    expected: sale.version(),
                    actual: Version::new(actual),
                },
                None => StoreError::NotFound(sale.id()),
            });
        };

        sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
            .bind(sale.id().as_uuid())
            .execute(&mut *conn)
            .await?;
        Self::insert_items(conn, sale).await?;

        Ok(Version::new(new_version))
    }
}

/// Races `fut` against the token. A fired token wins ties.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        res = fut => res,
    }
}

fn map_write_error(e: sqlx::Error, sale: &Sale) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some("unique_sale_number") {
            return StoreError::DuplicateSaleNumber(sale.sale_number().to_string());
        }
        if db_err.constraint() == Some("sales_pkey") {
            return StoreError::ConcurrencyConflict {
                sale_id: sale.id(),
                expected: Version::initial(),
                actual: sale.version(),
            };
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl SaleStore for PostgresSaleStore {
    #[tracing::instrument(skip(self, sale, cancel), fields(sale_id = %sale.id()))]
    async fn create(&self, mut sale: Sale, cancel: &CancellationToken) -> Result<Sale> {
        sale.set_version(Version::first());

        let mut tx = cancellable(cancel, async {
            self.pool.begin().await.map_err(StoreError::from)
        })
        .await?;
        cancellable(cancel, Self::write_new(&mut *tx, &sale)).await?;

        // Past this point the write is committed regardless of the token.
        tx.commit().await?;
        Ok(sale)
    }

    async fn get_by_id(&self, id: SaleId, cancel: &CancellationToken) -> Result<Option<Sale>> {
        cancellable(cancel, async {
            let rows = sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
            self.fetch_one(rows).await
        })
        .await
    }

    async fn get_by_number(
        &self,
        sale_number: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Sale>> {
        cancellable(cancel, async {
            let rows = sqlx::query(&format!(
                "SELECT {SALE_COLUMNS} FROM sales WHERE sale_number = $1"
            ))
            .bind(sale_number)
            .fetch_all(&self.pool)
            .await?;
            self.fetch_one(rows).await
        })
        .await
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Sale>> {
        cancellable(cancel, async {
            let rows = sqlx::query(&format!(
                "SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date ASC, sale_number ASC"
            ))
            .fetch_all(&self.pool)
            .await?;
            self.hydrate(rows).await
        })
        .await
    }

    async fn get_by_date_range(
        &self,
        range: DateRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<Sale>> {
        cancellable(cancel, async {
            let rows = sqlx::query(&format!(
                "SELECT {SALE_COLUMNS} FROM sales \
                 WHERE sale_date >= $1 AND sale_date <= $2 \
                 ORDER BY sale_date ASC, sale_number ASC"
            ))
            .bind(range.start())
            .bind(range.end())
            .fetch_all(&self.pool)
            .await?;
            self.hydrate(rows).await
        })
        .await
    }

    #[tracing::instrument(skip(self, sale, cancel), fields(sale_id = %sale.id()))]
    async fn update(&self, mut sale: Sale, cancel: &CancellationToken) -> Result<Sale> {
        let mut tx = cancellable(cancel, async {
            self.pool.begin().await.map_err(StoreError::from)
        })
        .await?;
        let new_version = cancellable(cancel, Self::write_update(&mut *tx, &sale)).await?;

        tx.commit().await?;
        sale.set_version(new_version);
        Ok(sale)
    }

    #[tracing::instrument(skip(self, cancel))]
    async fn delete(&self, id: SaleId, cancel: &CancellationToken) -> Result<bool> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        // A single statement commits on its own, so it is not raced.
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
