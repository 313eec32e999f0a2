//! Order Repository
//!
//! Order creation happens inside the placement transaction; every later
//! mutation is a guarded transition, a single UPDATE with the expected
//! statuses in its WHERE clause. At most one caller can win any given
//! transition, which is what makes callback replays harmless.

use super::{RepoError, RepoResult};
use shared::models::order::{Order, OrderDetail, OrderItem, OrderStatus, PaymentStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

/// Raw order row
#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_ref: Option<String>,
    total_amount: i64,
    status: String,
    payment_status: String,
    authority: Option<String>,
    gateway_ref: Option<String>,
    created_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status).ok_or_else(|| {
            RepoError::Database(format!("order {}: unknown status {}", row.id, row.status))
        })?;
        let payment_status = PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
            RepoError::Database(format!(
                "order {}: unknown payment status {}",
                row.id, row.payment_status
            ))
        })?;
        Ok(Order {
            id: row.id,
            customer_ref: row.customer_ref,
            total_amount: row.total_amount,
            status,
            payment_status,
            authority: row.authority,
            gateway_ref: row.gateway_ref,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i64,
    product_id: i64,
    name: String,
    unit_price: i64,
    quantity: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            order_id: row.order_id,
            product_id: row.product_id,
            name: row.name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

/// Line item captured for insertion (snapshots already taken)
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

/// Extra fields written by a transition (None = leave unchanged)
#[derive(Debug, Clone, Default)]
pub struct TransitionFields {
    pub authority: Option<String>,
    pub gateway_ref: Option<String>,
}

const SELECT_COLUMNS: &str =
    "id, customer_ref, total_amount, status, payment_status, authority, gateway_ref, created_at";

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order and its items in the caller's transaction.
    ///
    /// The total is computed here from the unit-price snapshots, never by
    /// re-reading current product prices.
    pub async fn create_with(
        conn: &mut SqliteConnection,
        customer_ref: Option<String>,
        items: &[NewOrderItem],
    ) -> RepoResult<Order> {
        if items.is_empty() {
            return Err(RepoError::Validation("order has no line items".into()));
        }

        let id = snowflake_id();
        let created_at = now_millis();
        let total_amount: i64 = items.iter().map(|i| i.unit_price * i.quantity).sum();

        sqlx::query(
            "INSERT INTO orders (id, customer_ref, total_amount, status, payment_status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(id)
        .bind(&customer_ref)
        .bind(total_amount)
        .bind(OrderStatus::Pending.as_str())
        .bind(PaymentStatus::NotPaid.as_str())
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, unit_price, quantity) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Ok(Order {
            id,
            customer_ref,
            total_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::NotPaid,
            authority: None,
            gateway_ref: None,
            created_at,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    /// Order with its line items
    pub async fn find_detail(&self, id: i64) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut conn = self.pool.acquire().await?;
        let items = Self::items_with(&mut conn, id).await?;
        Ok(Some(OrderDetail { order, items }))
    }

    /// All orders of one customer, newest first (the "My Orders" listing)
    pub async fn list_by_customer(&self, customer_ref: &str) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE customer_ref = ?1 ORDER BY created_at DESC"
        ))
        .bind(customer_ref)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Line items of an order, on an existing connection/transaction
    pub async fn items_with(
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> RepoResult<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, name, unit_price, quantity \
             FROM order_items WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Optimistic state transition.
    ///
    /// Succeeds only while the order's current status is one of `expected`;
    /// otherwise the order is untouched and `TransitionConflict` reports
    /// what the status actually was. `new_payment` of None leaves the
    /// payment status unchanged (customer cancellation).
    pub async fn transition(
        &self,
        order_id: i64,
        expected: &[OrderStatus],
        new_status: OrderStatus,
        new_payment: Option<PaymentStatus>,
        fields: TransitionFields,
    ) -> RepoResult<Order> {
        let mut conn = self.pool.acquire().await?;
        Self::transition_with(&mut conn, order_id, expected, new_status, new_payment, fields).await
    }

    /// Transition on an existing connection/transaction.
    pub async fn transition_with(
        conn: &mut SqliteConnection,
        order_id: i64,
        expected: &[OrderStatus],
        new_status: OrderStatus,
        new_payment: Option<PaymentStatus>,
        fields: TransitionFields,
    ) -> RepoResult<Order> {
        // expected statuses are static enum strings, safe to inline
        let guard = expected
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "UPDATE orders SET \
                status = ?1, \
                payment_status = COALESCE(?2, payment_status), \
                authority = COALESCE(?3, authority), \
                gateway_ref = COALESCE(?4, gateway_ref) \
             WHERE id = ?5 AND status IN ({guard}) \
             RETURNING {SELECT_COLUMNS}"
        );

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(new_status.as_str())
            .bind(new_payment.map(|p| p.as_str()))
            .bind(&fields.authority)
            .bind(&fields.gateway_ref)
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(row) = row {
            return Order::try_from(row);
        }

        // Guard failed: report the state the order is actually in
        let current: Option<(String, String)> =
            sqlx::query_as("SELECT status, payment_status FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *conn)
                .await?;

        match current {
            Some((status, payment_status)) => Err(RepoError::TransitionConflict {
                order_id,
                status: OrderStatus::parse(&status).unwrap_or_default(),
                payment_status: PaymentStatus::parse(&payment_status).unwrap_or_default(),
            }),
            None => Err(RepoError::NotFound(format!("Order {order_id}"))),
        }
    }
}
