//! Progress events and their delivery to observers.
mod events;
mod registry;


pub use events::ProgressEvent;
pub use registry::{
    OBSERVER_QUEUE_CAPACITY, Observer, ObserverId, ObserverRegistry, ProgressPublisher,
};
