//! Hand-off between the page and the UI.
//!
//! Custom-element lifecycle hooks and scriptable handles run outside the
//! Dioxus runtime, so they only queue commands here. The host component and
//! each mounted player drain their queues on a short poll. Listeners a
//! mounted player attaches to the document itself live no longer than the
//! player and write its state directly.
//!
//! Unmounting is two-step: `unmount` closes the mailbox to new commands, the
//! player applies whatever was queued before it, then `release` hands the
//! removal to the host.

use crate::config::PlayerConfig;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

pub type InstanceId = u32;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Mount { id: InstanceId, config: PlayerConfig },
    Unmount { id: InstanceId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    TogglePlay,
    ToggleMute,
    SetVolume(f64),
    SetTitle(String),
    SetArtist(String),
    SetSrc(String),
}

/// What a player picks up on one poll.
#[derive(Debug, Default, PartialEq)]
pub struct Drained {
    pub commands: Vec<PlayerCommand>,
    /// The instance was unmounted; nothing follows `commands`.
    pub closing: bool,
}

#[derive(Debug, Default)]
struct Mailbox {
    queue: VecDeque<PlayerCommand>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct Registry {
    next_id: InstanceId,
    host: VecDeque<HostCommand>,
    mailboxes: HashMap<InstanceId, Mailbox>,
}

impl Registry {
    pub fn mount(&mut self, config: PlayerConfig) -> InstanceId {
        self.next_id += 1;
        let id = self.next_id;
        self.mailboxes.insert(id, Mailbox::default());
        self.host.push_back(HostCommand::Mount { id, config });
        id
    }

    /// Close the mailbox; commands already queued are still delivered.
    /// Returns false for ids that are unknown or already unmounted.
    pub fn unmount(&mut self, id: InstanceId) -> bool {
        match self.mailboxes.get_mut(&id) {
            Some(mailbox) if !mailbox.closed => {
                mailbox.closed = true;
                true
            }
            _ => false,
        }
    }

    /// Called by a closing player once it has applied its last commands.
    pub fn release(&mut self, id: InstanceId) -> bool {
        if self.mailboxes.remove(&id).is_none() {
            return false;
        }
        self.host.push_back(HostCommand::Unmount { id });
        true
    }

    pub fn send(&mut self, id: InstanceId, command: PlayerCommand) -> bool {
        match self.mailboxes.get_mut(&id) {
            Some(mailbox) if !mailbox.closed => {
                mailbox.queue.push_back(command);
                true
            }
            _ => false,
        }
    }

    pub fn drain_host(&mut self) -> Vec<HostCommand> {
        self.host.drain(..).collect()
    }

    pub fn drain_player(&mut self, id: InstanceId) -> Drained {
        self.mailboxes
            .get_mut(&id)
            .map(|mailbox| Drained {
                commands: mailbox.queue.drain(..).collect(),
                closing: mailbox.closed,
            })
            .unwrap_or_default()
    }
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    REGISTRY.with(|registry| f(&mut registry.borrow_mut()))
}

pub fn mount(config: PlayerConfig) -> InstanceId {
    with_registry(|r| r.mount(config))
}

pub fn unmount(id: InstanceId) -> bool {
    with_registry(|r| r.unmount(id))
}

pub fn release(id: InstanceId) -> bool {
    with_registry(|r| r.release(id))
}

pub fn send(id: InstanceId, command: PlayerCommand) -> bool {
    with_registry(|r| r.send(id, command))
}

pub fn drain_host() -> Vec<HostCommand> {
    with_registry(Registry::drain_host)
}

pub fn drain_player(id: InstanceId) -> Drained {
    with_registry(|r| r.drain_player(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_assigns_fresh_ids_and_queues_host_commands() {
        let mut registry = Registry::default();
        let a = registry.mount(PlayerConfig::default());
        let b = registry.mount(PlayerConfig::default());
        assert_ne!(a, b);
        assert!(registry.send(a, PlayerCommand::Play));

        let commands = registry.drain_host();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], HostCommand::Mount { id, .. } if id == a));
        assert!(registry.drain_host().is_empty());
    }

    #[test]
    fn commands_reach_only_live_instances() {
        let mut registry = Registry::default();
        let id = registry.mount(PlayerConfig::default());
        assert!(registry.send(id, PlayerCommand::Play));
        assert!(registry.send(id, PlayerCommand::SetTitle("New".to_string())));
        assert!(!registry.send(id + 1, PlayerCommand::Pause));

        let drained = registry.drain_player(id);
        assert_eq!(
            drained.commands,
            vec![PlayerCommand::Play, PlayerCommand::SetTitle("New".to_string())]
        );
        assert!(!drained.closing);
        assert!(registry.drain_player(id).commands.is_empty());
    }

    #[test]
    fn unmount_closes_the_mailbox_once() {
        let mut registry = Registry::default();
        let id = registry.mount(PlayerConfig::default());
        registry.drain_host();

        assert!(registry.unmount(id));
        assert!(!registry.unmount(id));
        assert!(!registry.send(id, PlayerCommand::Play));
        assert!(registry.drain_host().is_empty());

        let drained = registry.drain_player(id);
        assert!(drained.commands.is_empty());
        assert!(drained.closing);

        assert!(registry.release(id));
        assert!(!registry.release(id));
        assert_eq!(registry.drain_host(), vec![HostCommand::Unmount { id }]);
        assert_eq!(registry.drain_player(id), Drained::default());
    }

    #[test]
    fn pause_queued_before_destroy_is_still_delivered() {
        let mut registry = Registry::default();
        let id = registry.mount(PlayerConfig::default());

        assert!(registry.send(id, PlayerCommand::Pause));
        assert!(registry.unmount(id));

        assert_eq!(
            registry.drain_player(id),
            Drained {
                commands: vec![PlayerCommand::Pause],
                closing: true,
            }
        );
    }

    #[test]
    fn thread_local_helpers_share_one_registry() {
        let id = mount(PlayerConfig::default());
        assert!(send(id, PlayerCommand::Pause));
        assert!(unmount(id));
        assert_eq!(drain_player(id).commands, vec![PlayerCommand::Pause]);
        assert!(release(id));
        let host = drain_host();
        assert!(host.contains(&HostCommand::Unmount { id }));
    }
}
