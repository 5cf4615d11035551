// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::state::TransitionResult;
use clean_aceh_audit::{Actor, StatusHistoryEntry};
use clean_aceh_domain::{Order, OrderStatus};
use time::OffsetDateTime;

/// Applies a status transition to an order, producing the new order and
/// its history entry.
///
/// This function is pure: it does not touch storage and does not check
/// who is asking. Callers authorize first.
///
/// # Errors
///
/// Returns an error if the transition table does not allow the change.
pub fn apply_transition(
    order: &Order,
    target: OrderStatus,
    actor: Actor,
    note: Option<String>,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let next: Order = order.transitioned(target, now)?;
    let note: String = note.unwrap_or_else(|| format!("Status changed to {target}"));
    let history: StatusHistoryEntry = StatusHistoryEntry::transition(
        order.id,
        order.status,
        target,
        actor,
        Some(note),
        next.updated_at,
    );

    Ok(TransitionResult {
        order: next,
        history,
    })
}
