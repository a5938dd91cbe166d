// Collaborator contracts the controllers depend on, plus their
// implementations for the hosted store client. Injected explicitly so
// tests can substitute fakes.
pub mod media_store;
pub mod remote_store;
