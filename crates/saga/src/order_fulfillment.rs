//! Order fulfillment saga constants.

/// The saga type identifier for order fulfillment.
pub const SAGA_TYPE: &str = "OrderFulfillment";

/// Step name: validate stock for the ordered book.
pub const STEP_CHECK_INVENTORY: &str = "check_inventory";

/// Step name: price the order.
pub const STEP_CALCULATE_TOTAL: &str = "calculate_total";

/// Step name: redeem the user's loyalty points.
pub const STEP_REDEEM_POINTS: &str = "redeem_points";

/// Step name: charge the customer.
pub const STEP_BILL_CUSTOMER: &str = "bill_customer";

/// Step name: asynchronous courier assignment.
pub const STEP_ASSIGN_COURIER: &str = "assign_courier";

/// Compensation name: roll back a committed inventory decrement.
pub const COMP_RESTORE_QUANTITY: &str = "restore_quantity";

/// Compensation name: restore redeemed loyalty points.
pub const COMP_RESTORE_REDEEMED_POINTS: &str = "restore_redeemed_points";
