// Soundkeys Notifier
// Named-event publish/subscribe for table and settings snapshots

use std::fmt;
use std::sync::Arc;

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::mapping::BindingTable;
use crate::settings::Settings;

/// Event names a subscriber can register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, EnumIter)]
pub enum EventName {
    #[strum(serialize = "config_update")]
    ConfigUpdate,
    #[strum(serialize = "setting_update")]
    SettingUpdate,
}

impl EventName {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published event with its new snapshot
#[derive(Debug, Clone)]
pub enum Notification {
    ConfigUpdate(Arc<BindingTable>),
    SettingUpdate(Arc<Settings>),
}

impl Notification {
    /// Event name this notification is delivered under
    pub fn name(&self) -> EventName {
        match self {
            Notification::ConfigUpdate(_) => EventName::ConfigUpdate,
            Notification::SettingUpdate(_) => EventName::SettingUpdate,
        }
    }
}

type Callback = Box<dyn FnMut(&Notification)>;

/// Subscriber list owned by the composition root.
///
/// Delivery is synchronous and in registration order. There is no queue
/// and no unsubscribe; subscribers live as long as the notifier.
#[derive(Default)]
pub struct Notifier {
    subscribers: Vec<(EventName, Callback)>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register a callback for one event name
    pub fn subscribe<F>(&mut self, name: EventName, callback: F)
    where
        F: FnMut(&Notification) + 'static,
    {
        log::trace!("Subscriber registered for '{}'", name);
        self.subscribers.push((name, Box::new(callback)));
    }

    /// Deliver a notification to every subscriber of its event name.
    ///
    /// Returns the number of callbacks invoked.
    pub fn publish(&mut self, notification: &Notification) -> usize {
        let name = notification.name();
        let mut delivered = 0;
        for (_, callback) in self.subscribers.iter_mut().filter(|(n, _)| *n == name) {
            callback(notification);
            delivered += 1;
        }
        log::debug!("Published '{}' to {} subscriber(s)", name, delivered);
        delivered
    }

    /// Number of subscribers registered for an event name
    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.subscribers.iter().filter(|(n, _)| *n == name).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::action::ActionKind;
    use crate::key::KeyCode;
    use crate::mapping::apply_edit;
    use crate::modifier::ModifierSet;

    #[test]
    fn test_event_name_strings() {
        assert_eq!(EventName::ConfigUpdate.as_str(), "config_update");
        assert_eq!(EventName::SettingUpdate.to_string(), "setting_update");
        assert_eq!("config_update".parse::<EventName>(), Ok(EventName::ConfigUpdate));
        assert!("table_changed".parse::<EventName>().is_err());
    }

    #[test]
    fn test_publish_with_no_subscribers() {
        let mut notifier = Notifier::new();
        let delivered =
            notifier.publish(&Notification::ConfigUpdate(Arc::new(BindingTable::new())));
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_publish_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::new();
        for id in 0..3 {
            let log = Rc::clone(&log);
            notifier.subscribe(EventName::ConfigUpdate, move |_| log.borrow_mut().push(id));
        }

        let delivered =
            notifier.publish(&Notification::ConfigUpdate(Arc::new(BindingTable::new())));
        assert_eq!(delivered, 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_publish_filters_by_event_name() {
        let configs = Rc::new(RefCell::new(0));
        let settings = Rc::new(RefCell::new(0));
        let mut notifier = Notifier::new();
        {
            let configs = Rc::clone(&configs);
            notifier.subscribe(EventName::ConfigUpdate, move |_| *configs.borrow_mut() += 1);
        }
        {
            let settings = Rc::clone(&settings);
            notifier.subscribe(EventName::SettingUpdate, move |_| *settings.borrow_mut() += 1);
        }

        notifier.publish(&Notification::SettingUpdate(Arc::new(Settings::new())));
        assert_eq!(*configs.borrow(), 0);
        assert_eq!(*settings.borrow(), 1);
        assert_eq!(notifier.subscriber_count(EventName::ConfigUpdate), 1);
    }

    #[test]
    fn test_subscriber_receives_snapshot() {
        let seen = Rc::new(RefCell::new(None));
        let mut notifier = Notifier::new();
        {
            let seen = Rc::clone(&seen);
            notifier.subscribe(EventName::ConfigUpdate, move |n| {
                if let Notification::ConfigUpdate(table) = n {
                    *seen.borrow_mut() = Some(Arc::clone(table));
                }
            });
        }

        let (table, _) = apply_edit(
            &BindingTable::new(),
            &KeyCode::from("a"),
            &ModifierSet::new(),
            ActionKind::StopAll,
        );
        let snapshot = Arc::new(table);
        notifier.publish(&Notification::ConfigUpdate(Arc::clone(&snapshot)));

        let seen = seen.borrow();
        assert!(Arc::ptr_eq(seen.as_ref().unwrap(), &snapshot));
    }
}
