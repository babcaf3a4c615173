/// Runtime values.
///
/// Defines [`core::Value`] and the shared function, generic-function, union
/// type, constructor and instance representations it points to. Also holds
/// truthiness, equality and the type tests used by generic dispatch.
pub mod core;
