// Request intake: contact validation, the typed wizard draft, and the
// submit endpoint that persists `pending` requests and queues them.

pub mod draft;
pub mod handlers;
pub mod validation;
