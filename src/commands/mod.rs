// Reconcile desired state against the host
pub mod apply;
