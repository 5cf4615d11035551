// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory store implementation.
//!
//! [`InMemoryStore`] implements every storage and side-effect port behind a
//! single lock, which makes each check-and-write atomic. It is used by
//! tests and for running the server without a database. State is lost
//! when the process exits.

use crate::command::{ListOrders, ListPayments};
use crate::notify::{CleanerStats, Notification, NotificationSink};
use crate::store::{
    CasOutcome, OrderScope, OrderStore, Page, PaymentRecord, PaymentStore, StoreError,
};
use async_trait::async_trait;
use clean_aceh_audit::StatusHistoryEntry;
use clean_aceh_domain::{
    Address, CleanerProfile, CustomerContact, DayOfWeek, Order, OrderSort, OrderStatus,
    PageRequest, Payment, PaymentMethod, PaymentStatus, ServiceOffering, SortDirection,
    WeeklyScheduleEntry,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    cleaners: HashMap<Uuid, CleanerProfile>,
    services: HashMap<Uuid, ServiceOffering>,
    addresses: HashMap<Uuid, Address>,
    schedules: HashMap<(Uuid, DayOfWeek), WeeklyScheduleEntry>,
    customers: HashMap<Uuid, CustomerContact>,
    payment_methods: HashMap<Uuid, PaymentMethod>,
    orders: Vec<Order>,
    history: Vec<StatusHistoryEntry>,
    payments: Vec<Payment>,
    notifications: Vec<Notification>,
    completed_jobs: HashMap<Uuid, u32>,
}

/// Thread-safe in-memory implementation of the store ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

fn poison_err<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable(String::from("lock poisoned"))
}

/// Cuts one page out of the full, already sorted match list.
fn paginate<T>(matches: Vec<T>, page: PageRequest) -> Page<T> {
    let total = u64::try_from(matches.len()).unwrap_or(u64::MAX);
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    Page {
        items: matches.into_iter().skip(skip).take(take).collect(),
        total,
    }
}

fn compare_orders(a: &Order, b: &Order, sort: OrderSort) -> Ordering {
    match sort {
        OrderSort::CreatedAt => a.timestamps.created_at.cmp(&b.timestamps.created_at),
        OrderSort::ServiceDate => a.service_date.cmp(&b.service_date),
        OrderSort::TotalPrice => a.pricing.total_price.cmp(&b.pricing.total_price),
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StoreError> {
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(f(&tables))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> Result<R, StoreError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        Ok(f(&mut tables))
    }

    /// Adds or replaces a cleaner profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_cleaner(&self, cleaner: CleanerProfile) -> Result<(), StoreError> {
        self.write(|t| {
            t.cleaners.insert(cleaner.id, cleaner);
        })
    }

    /// Adds or replaces a service offering.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_service(&self, service: ServiceOffering) -> Result<(), StoreError> {
        self.write(|t| {
            t.services.insert(service.id, service);
        })
    }

    /// Adds or replaces an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_address(&self, address: Address) -> Result<(), StoreError> {
        self.write(|t| {
            t.addresses.insert(address.id, address);
        })
    }

    /// Adds or replaces a cleaner's schedule for one weekday.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_schedule(&self, entry: WeeklyScheduleEntry) -> Result<(), StoreError> {
        self.write(|t| {
            t.schedules.insert((entry.cleaner_id, entry.day_of_week), entry);
        })
    }

    /// Adds or replaces a customer's contact details.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_customer(&self, contact: CustomerContact) -> Result<(), StoreError> {
        self.write(|t| {
            t.customers.insert(contact.user_id, contact);
        })
    }

    /// Adds or replaces a payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn put_payment_method(&self, method: PaymentMethod) -> Result<(), StoreError> {
        self.write(|t| {
            t.payment_methods.insert(method.id, method);
        })
    }

    /// Notifications recorded so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn notifications(&self) -> Result<Vec<Notification>, StoreError> {
        self.read(|t| t.notifications.clone())
    }

    /// Completed jobs counted for a cleaner.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn completed_jobs(&self, cleaner_id: Uuid) -> Result<u32, StoreError> {
        self.read(|t| t.completed_jobs.get(&cleaner_id).copied().unwrap_or(0))
    }

    /// Number of stored orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn order_count(&self) -> Result<usize, StoreError> {
        self.read(|t| t.orders.len())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn find_cleaner(&self, cleaner_id: Uuid) -> Result<Option<CleanerProfile>, StoreError> {
        self.read(|t| t.cleaners.get(&cleaner_id).cloned())
    }

    async fn find_cleaner_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CleanerProfile>, StoreError> {
        self.read(|t| t.cleaners.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn find_service(
        &self,
        service_id: Uuid,
    ) -> Result<Option<ServiceOffering>, StoreError> {
        self.read(|t| t.services.get(&service_id).cloned())
    }

    async fn find_address(
        &self,
        address_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Address>, StoreError> {
        self.read(|t| {
            t.addresses
                .get(&address_id)
                .filter(|a| a.user_id == owner)
                .cloned()
        })
    }

    async fn find_schedule(
        &self,
        cleaner_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Option<WeeklyScheduleEntry>, StoreError> {
        self.read(|t| t.schedules.get(&(cleaner_id, day)).cloned())
    }

    async fn list_active_orders(
        &self,
        cleaner_id: Uuid,
        date: Date,
    ) -> Result<Vec<Order>, StoreError> {
        self.read(|t| {
            t.orders
                .iter()
                .filter(|o| o.cleaner_id == cleaner_id && o.service_date == date)
                .filter(|o| o.status.is_active())
                .cloned()
                .collect()
        })
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.write(|t| {
            let taken = t.orders.iter().any(|o| {
                o.cleaner_id == order.cleaner_id
                    && o.service_date == order.service_date
                    && o.status.is_active()
            });
            if taken && order.status.is_active() {
                return Err(StoreError::Conflict {
                    resource: "orders",
                    message: format!(
                        "cleaner {} already has an active order on {}",
                        order.cleaner_id, order.service_date
                    ),
                });
            }
            t.orders.push(order.clone());
            Ok(())
        })?
    }

    async fn find_order(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        self.read(|t| t.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn update_order(
        &self,
        expected: OrderStatus,
        updated: &Order,
    ) -> Result<CasOutcome<Order, OrderStatus>, StoreError> {
        self.write(|t| {
            let Some(row) = t.orders.iter_mut().find(|o| o.id == updated.id) else {
                return CasOutcome::NotFound;
            };
            if row.status != expected {
                return CasOutcome::StateMismatch { actual: row.status };
            }
            *row = updated.clone();
            CasOutcome::Applied(row.clone())
        })
    }

    async fn append_history(&self, entry: &StatusHistoryEntry) -> Result<(), StoreError> {
        self.write(|t| t.history.push(entry.clone()))
    }

    async fn list_history(&self, order_id: Uuid) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        self.read(|t| {
            t.history
                .iter()
                .filter(|h| h.order_id == order_id)
                .cloned()
                .collect()
        })
    }

    async fn list_orders(
        &self,
        scope: OrderScope,
        query: &ListOrders,
    ) -> Result<Page<Order>, StoreError> {
        self.read(|t| {
            let mut matches: Vec<Order> = t
                .orders
                .iter()
                .filter(|o| scope.includes(o))
                .filter(|o| query.statuses.is_empty() || query.statuses.contains(&o.status))
                .cloned()
                .collect();
            matches.sort_by(|a, b| {
                let ordering = compare_orders(a, b, query.sort);
                match query.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
            paginate(matches, query.page)
        })
    }

    async fn list_order_statuses(&self, scope: OrderScope) -> Result<Vec<OrderStatus>, StoreError> {
        self.read(|t| {
            t.orders
                .iter()
                .filter(|o| scope.includes(o))
                .map(|o| o.status)
                .collect()
        })
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn find_payment_method(
        &self,
        method_id: Uuid,
        owner: Uuid,
    ) -> Result<Option<PaymentMethod>, StoreError> {
        self.read(|t| {
            t.payment_methods
                .get(&method_id)
                .filter(|m| m.user_id == owner && m.is_active)
                .cloned()
        })
    }

    async fn find_customer_contact(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CustomerContact>, StoreError> {
        self.read(|t| t.customers.get(&user_id).cloned())
    }

    async fn find_active_payment(&self, order_id: Uuid) -> Result<Option<Payment>, StoreError> {
        self.read(|t| {
            t.payments
                .iter()
                .find(|p| p.order_id == order_id && p.status.is_active())
                .cloned()
        })
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError> {
        self.write(|t| {
            let taken = t
                .payments
                .iter()
                .any(|p| p.order_id == payment.order_id && p.status.is_active());
            if taken {
                return Err(StoreError::Conflict {
                    resource: "payments",
                    message: format!("order {} already has an active payment", payment.order_id),
                });
            }
            t.payments.push(payment.clone());
            Ok(())
        })?
    }

    async fn set_payment_transaction_id(
        &self,
        payment_id: Uuid,
        transaction_id: &str,
    ) -> Result<(), StoreError> {
        self.write(|t| {
            if let Some(p) = t.payments.iter_mut().find(|p| p.id == payment_id) {
                p.transaction_id = Some(transaction_id.to_string());
            }
        })
    }

    async fn find_payment_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, StoreError> {
        self.read(|t| t.payments.iter().find(|p| p.reference == reference).cloned())
    }

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        expected: PaymentStatus,
        target: PaymentStatus,
        paid_at: Option<OffsetDateTime>,
    ) -> Result<CasOutcome<Payment, PaymentStatus>, StoreError> {
        self.write(|t| {
            let Some(row) = t.payments.iter_mut().find(|p| p.id == payment_id) else {
                return CasOutcome::NotFound;
            };
            if row.status != expected {
                return CasOutcome::StateMismatch { actual: row.status };
            }
            row.status = target;
            if paid_at.is_some() {
                row.paid_at = paid_at;
            }
            CasOutcome::Applied(row.clone())
        })
    }

    async fn list_payments(&self, order_id: Uuid) -> Result<Vec<Payment>, StoreError> {
        self.read(|t| {
            t.payments
                .iter()
                .filter(|p| p.order_id == order_id)
                .cloned()
                .collect()
        })
    }

    async fn find_payment(&self, payment_id: Uuid) -> Result<Option<PaymentRecord>, StoreError> {
        self.read(|t| {
            let payment = t.payments.iter().find(|p| p.id == payment_id)?;
            let order = t.orders.iter().find(|o| o.id == payment.order_id)?;
            Some(PaymentRecord::new(payment.clone(), order))
        })
    }

    async fn list_customer_payments(
        &self,
        customer_id: Uuid,
        query: &ListPayments,
    ) -> Result<Page<PaymentRecord>, StoreError> {
        self.read(|t| {
            let mut matches: Vec<PaymentRecord> = t
                .payments
                .iter()
                .filter(|p| query.status.is_none_or(|status| p.status == status))
                .filter_map(|p| {
                    t.orders
                        .iter()
                        .find(|o| o.id == p.order_id && o.customer_id == customer_id)
                        .map(|o| PaymentRecord::new(p.clone(), o))
                })
                .collect();
            matches.sort_by(|a, b| b.payment.created_at.cmp(&a.payment.created_at));
            paginate(matches, query.page)
        })
    }
}

#[async_trait]
impl NotificationSink for InMemoryStore {
    async fn notify(&self, notification: Notification) -> Result<(), StoreError> {
        self.write(|t| t.notifications.push(notification))
    }
}

#[async_trait]
impl CleanerStats for InMemoryStore {
    async fn record_completed_job(&self, cleaner_id: Uuid) -> Result<(), StoreError> {
        self.write(|t| {
            *t.completed_jobs.entry(cleaner_id).or_insert(0) += 1;
        })
    }
}
