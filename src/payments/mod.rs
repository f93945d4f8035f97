pub mod minimum;
pub mod payoff;
pub mod resolver;

pub use minimum::{minimum_payment, MinimumPaymentCalculator};
pub use payoff::{PayoffPayment, PayoffPlan, PayoffPlanner};
pub use resolver::{AmountResolver, ResolvedAmount};
