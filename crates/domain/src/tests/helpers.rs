// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DayOfWeek, LifecycleTimestamps, Order, OrderStatus, PriceBreakdown, TimeOfDay,
    WeeklyScheduleEntry,
};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0100);
pub const CLEANER_ID: Uuid = Uuid::from_u128(0x0200);
pub const CLEANER_USER_ID: Uuid = Uuid::from_u128(0x0201);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0300);
pub const STRANGER_ID: Uuid = Uuid::from_u128(0x0400);

/// 2026-03-10 is a Tuesday.
pub const SERVICE_DATE: Date = date!(2026 - 03 - 10);
pub const CREATED_AT: OffsetDateTime = datetime!(2026-03-01 10:00 +07:00);

pub fn hm(raw: &str) -> TimeOfDay {
    raw.parse().unwrap()
}

pub fn create_test_order(status: OrderStatus) -> Order {
    Order {
        id: Uuid::from_u128(0x1000),
        order_number: String::from("CA123456789"),
        customer_id: CUSTOMER_ID,
        cleaner_id: CLEANER_ID,
        service_id: Uuid::from_u128(0x0500),
        address_id: None,
        service_address: String::from("Jl. Teuku Umar No. 5, Banda Aceh"),
        status,
        service_date: SERVICE_DATE,
        start_time: hm("09:00"),
        end_time: Some(hm("11:00")),
        pricing: PriceBreakdown {
            base_price: 150_000,
            add_ons_price: 30_000,
            platform_fee: 10_000,
            tax_amount: 19_800,
            total_price: 195_000,
        },
        additional_services: vec![String::from("Ironing")],
        special_instructions: None,
        timestamps: LifecycleTimestamps::created(CREATED_AT),
        updated_at: CREATED_AT,
    }
}

pub fn create_test_schedule(start: &str, end: &str) -> WeeklyScheduleEntry {
    WeeklyScheduleEntry {
        cleaner_id: CLEANER_ID,
        day_of_week: DayOfWeek::of(SERVICE_DATE),
        start_time: hm(start),
        end_time: hm(end),
        is_available: true,
    }
}
