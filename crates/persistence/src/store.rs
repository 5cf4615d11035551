// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store ports backed by Supabase tables.
//!
//! Compare-and-set writes are `PATCH` requests filtered on both the row
//! id and the expected status. An empty response means the filter did
//! not match; the row is then re-read to tell a missing row from one in
//! a different state.

use crate::client::{PostgrestClient, Query};
use crate::error::PersistenceError;
use crate::rows::{
    AddressRow, CleanerRow, CleanerStatsArgs, HistoryRow, NotificationRow, OrderRow,
    OrderStatusPatch, OrderStatusRow, PaymentMethodRow, PaymentRecordRow, PaymentRow,
    PaymentStatusPatch, ScheduleRow, ServiceRow, UserRow,
};
use async_trait::async_trait;
use clean_aceh::{
    CasOutcome, CleanerStats, ListOrders, ListPayments, Notification, NotificationSink,
    OrderScope, OrderStore, Page, PaymentRecord, PaymentStore, StoreError,
};
use clean_aceh_audit::StatusHistoryEntry;
use clean_aceh_domain::{
    Address, CleanerProfile, CustomerContact, DayOfWeek, Order, OrderStatus, Payment,
    PaymentMethod, PaymentStatus, ServiceOffering, SortDirection, WeeklyScheduleEntry,
};
use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

const ORDERS: &str = "orders";
const HISTORY: &str = "order_status_history";
const PAYMENTS: &str = "payments";

const CLEANER_COLUMNS: &str = "id,user_id,is_available,users(full_name,phone,status)";
const PAYMENT_RECORD_COLUMNS: &str = "*,orders!inner(order_number,service_date,customer_id)";

/// Narrows an order query to `scope`.
fn scoped(query: Query, scope: OrderScope) -> Query {
    match scope {
        OrderScope::Customer(customer_id) => query.eq("customer_id", customer_id),
        OrderScope::Cleaner(cleaner_id) => query.eq("cleaner_id", cleaner_id),
        OrderScope::All => query,
    }
}

/// Supabase-backed implementation of the store ports.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: PostgrestClient,
}

impl SupabaseStore {
    /// Creates a store over an existing client.
    #[must_use]
    pub const fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    /// Creates a store for the Supabase project at `project_url`.
    #[must_use]
    pub fn connect(project_url: &str, service_role_key: impl Into<String>) -> Self {
        Self::new(PostgrestClient::new(project_url, service_role_key))
    }

    async fn order_by_id(&self, order_id: Uuid) -> Result<Option<Order>, PersistenceError> {
        let row: Option<OrderRow> = self
            .client
            .select_one(ORDERS, Query::new().select("*").eq("id", order_id))
            .await?;
        Ok(row.map(Order::from))
    }

    async fn payment_by(&self, query: Query) -> Result<Option<Payment>, PersistenceError> {
        let row: Option<PaymentRow> = self
            .client
            .select_one(PAYMENTS, query.select("*").order_asc("created_at"))
            .await?;
        Ok(row.map(Payment::from))
    }
}

#[async_trait]
impl OrderStore for SupabaseStore {
    async fn find_cleaner(&self, cleaner_id: Uuid) -> Result<Option<CleanerProfile>, StoreError> {
        let row: Option<CleanerRow> = self
            .client
            .select_one(
                "cleaner_profiles",
                Query::new().select(CLEANER_COLUMNS).eq("id", cleaner_id),
            )
            .await?;
        Ok(row.map(CleanerProfile::from))
    }

    async fn find_cleaner_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CleanerProfile>, StoreError> {
        let row: Option<CleanerRow> = self
            .client
            .select_one(
                "cleaner_profiles",
                Query::new().select(CLEANER_COLUMNS).eq("user_id", user_id),
            )
            .await?;
        Ok(row.map(CleanerProfile::from))
    }

    async fn find_service(
        &self,
        service_id: Uuid,
    ) -> Result<Option<ServiceOffering>, StoreError> {
        let row: Option<ServiceRow> = self
            .client
            .select_one(
                "services",
                Query::new()
                    .select("id,name,description,is_active")
                    .eq("id", service_id),
            )
            .await?;
        Ok(row.map(ServiceOffering::from))
    }

    async fn find_address(
        &self,
        address_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Address>, StoreError> {
        let row: Option<AddressRow> = self
            .client
            .select_one(
                "user_addresses",
                Query::new()
                    .select("id,user_id,label,full_address,city")
                    .eq("id", address_id)
                    .eq("user_id", owner),
            )
            .await?;
        Ok(row.map(Address::from))
    }

    async fn find_schedule(
        &self,
        cleaner_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Option<WeeklyScheduleEntry>, StoreError> {
        let row: Option<ScheduleRow> = self
            .client
            .select_one(
                "cleaner_schedules",
                Query::new()
                    .select("cleaner_id,day_of_week,start_time,end_time,is_available")
                    .eq("cleaner_id", cleaner_id)
                    .eq("day_of_week", day.number()),
            )
            .await?;
        Ok(row.map(WeeklyScheduleEntry::try_from).transpose()?)
    }

    async fn list_active_orders(
        &self,
        cleaner_id: Uuid,
        date: Date,
    ) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = self
            .client
            .select(
                ORDERS,
                &Query::new()
                    .select("*")
                    .eq("cleaner_id", cleaner_id)
                    .eq("service_date", date)
                    .in_list("status", OrderStatus::ACTIVE.iter().map(OrderStatus::as_str)),
            )
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.client.insert(ORDERS, &OrderRow::from(order)).await?;
        Ok(())
    }

    async fn find_order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.order_by_id(order_id).await?)
    }

    async fn update_order(
        &self,
        expected: OrderStatus,
        updated: &Order,
    ) -> Result<CasOutcome<Order, OrderStatus>, StoreError> {
        let rows: Vec<OrderRow> = self
            .client
            .update(
                ORDERS,
                &Query::new()
                    .eq("id", updated.id)
                    .eq("status", expected.as_str()),
                &OrderStatusPatch::from(updated),
            )
            .await?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(CasOutcome::Applied(Order::from(row)));
        }

        debug!(order_id = %updated.id, %expected, "Order update matched no row");
        Ok(match self.order_by_id(updated.id).await? {
            None => CasOutcome::NotFound,
            Some(current) => CasOutcome::StateMismatch {
                actual: current.status,
            },
        })
    }

    async fn append_history(&self, entry: &StatusHistoryEntry) -> Result<(), StoreError> {
        self.client.insert(HISTORY, &HistoryRow::from(entry)).await?;
        Ok(())
    }

    async fn list_history(&self, order_id: Uuid) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        let rows: Vec<HistoryRow> = self
            .client
            .select(
                HISTORY,
                &Query::new()
                    .select("*")
                    .eq("order_id", order_id)
                    .order_asc("created_at"),
            )
            .await?;
        Ok(rows.into_iter().map(StatusHistoryEntry::from).collect())
    }

    async fn list_orders(
        &self,
        scope: OrderScope,
        query: &ListOrders,
    ) -> Result<Page<Order>, StoreError> {
        let mut filter = scoped(Query::new().select("*"), scope);
        if !query.statuses.is_empty() {
            filter = filter.in_list("status", query.statuses.iter().map(OrderStatus::as_str));
        }
        let filter = match query.direction {
            SortDirection::Ascending => filter.order_asc(query.sort.as_str()),
            SortDirection::Descending => filter.order_desc(query.sort.as_str()),
        };
        let filter = filter
            .offset(query.page.offset())
            .limit(query.page.limit());

        let (rows, total): (Vec<OrderRow>, u64) =
            self.client.select_page(ORDERS, &filter).await?;
        Ok(Page {
            items: rows.into_iter().map(Order::from).collect(),
            total,
        })
    }

    async fn list_order_statuses(&self, scope: OrderScope) -> Result<Vec<OrderStatus>, StoreError> {
        let rows: Vec<OrderStatusRow> = self
            .client
            .select(ORDERS, &scoped(Query::new().select("status"), scope))
            .await?;
        Ok(rows.into_iter().map(|row| row.status).collect())
    }
}

#[async_trait]
impl PaymentStore for SupabaseStore {
    async fn find_payment_method(
        &self,
        method_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<PaymentMethod>, StoreError> {
        let row: Option<PaymentMethodRow> = self
            .client
            .select_one(
                "payment_methods",
                Query::new()
                    .select("*")
                    .eq("id", method_id)
                    .eq("user_id", owner)
                    .eq("is_active", true),
            )
            .await?;
        Ok(row.map(PaymentMethod::try_from).transpose()?)
    }

    async fn find_customer_contact(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CustomerContact>, StoreError> {
        let row: Option<UserRow> = self
            .client
            .select_one(
                "users",
                Query::new()
                    .select("id,full_name,email,phone")
                    .eq("id", user_id),
            )
            .await?;
        Ok(row.map(CustomerContact::from))
    }

    async fn find_active_payment(&self, order_id: Uuid) -> Result<Option<Payment>, StoreError> {
        let active = [PaymentStatus::Pending, PaymentStatus::Paid];
        Ok(self
            .payment_by(
                Query::new()
                    .eq("order_id", order_id)
                    .in_list("status", active.iter().map(PaymentStatus::as_str)),
            )
            .await?)
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError> {
        self.client
            .insert(PAYMENTS, &PaymentRow::from(payment))
            .await?;
        Ok(())
    }

    async fn set_payment_transaction_id(
        &self,
        payment_id: Uuid,
        transaction_id: &str,
    ) -> Result<(), StoreError> {
        let _: Vec<PaymentRow> = self
            .client
            .update(
                PAYMENTS,
                &Query::new().eq("id", payment_id),
                &serde_json::json!({ "gateway_transaction_id": transaction_id }),
            )
            .await?;
        Ok(())
    }

    async fn find_payment_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .payment_by(Query::new().eq("payment_reference", reference))
            .await?)
    }

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        expected: PaymentStatus,
        target: PaymentStatus,
        paid_at: Option<OffsetDateTime>,
    ) -> Result<CasOutcome<Payment, PaymentStatus>, StoreError> {
        let rows: Vec<PaymentRow> = self
            .client
            .update(
                PAYMENTS,
                &Query::new()
                    .eq("id", payment_id)
                    .eq("status", expected.as_str()),
                &PaymentStatusPatch {
                    status: target,
                    paid_at,
                },
            )
            .await?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(CasOutcome::Applied(Payment::from(row)));
        }

        debug!(%payment_id, %expected, "Payment update matched no row");
        Ok(
            match self.payment_by(Query::new().eq("id", payment_id)).await? {
                None => CasOutcome::NotFound,
                Some(current) => CasOutcome::StateMismatch {
                    actual: current.status,
                },
            },
        )
    }

    async fn list_payments(&self, order_id: Uuid) -> Result<Vec<Payment>, StoreError> {
        let rows: Vec<PaymentRow> = self
            .client
            .select(
                PAYMENTS,
                &Query::new()
                    .select("*")
                    .eq("order_id", order_id)
                    .order_asc("created_at"),
            )
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn find_payment(&self, payment_id: Uuid) -> Result<Option<PaymentRecord>, StoreError> {
        let row: Option<PaymentRecordRow> = self
            .client
            .select_one(
                PAYMENTS,
                Query::new()
                    .select(PAYMENT_RECORD_COLUMNS)
                    .eq("id", payment_id),
            )
            .await?;
        Ok(row.map(PaymentRecord::from))
    }

    async fn list_customer_payments(
        &self,
        customer_id: Uuid,
        query: &ListPayments,
    ) -> Result<Page<PaymentRecord>, StoreError> {
        let mut filter = Query::new()
            .select(PAYMENT_RECORD_COLUMNS)
            .eq("orders.customer_id", customer_id);
        if let Some(status) = query.status {
            filter = filter.eq("status", status.as_str());
        }
        let filter = filter
            .order_desc("created_at")
            .offset(query.page.offset())
            .limit(query.page.limit());

        let (rows, total): (Vec<PaymentRecordRow>, u64) =
            self.client.select_page(PAYMENTS, &filter).await?;
        Ok(Page {
            items: rows.into_iter().map(PaymentRecord::from).collect(),
            total,
        })
    }
}

#[async_trait]
impl NotificationSink for SupabaseStore {
    async fn notify(&self, notification: Notification) -> Result<(), StoreError> {
        self.client
            .insert("notifications", &NotificationRow::from(notification))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CleanerStats for SupabaseStore {
    async fn record_completed_job(&self, cleaner_id: Uuid) -> Result<(), StoreError> {
        self.client
            .rpc("increment_cleaner_stats", &CleanerStatsArgs { cleaner_id })
            .await?;
        Ok(())
    }
}
