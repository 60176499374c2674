use crate::components::{sleep_ms, MusicPlayer, POLL_INTERVAL_MS};
use crate::config::PlayerConfig;
use crate::registry::{self, HostCommand, InstanceId};
use dioxus::prelude::*;
use tracing::info;

/// Renders every live player instance. Instances come and go through the
/// registry: custom-tag attach/detach, the scriptable constructor, `destroy`
/// and config-script auto-initialization all end up here.
#[component]
pub fn PlayerHost() -> Element {
    let mut instances = use_signal(Vec::<(InstanceId, PlayerConfig)>::new);

    use_future(move || async move {
        loop {
            for command in registry::drain_host() {
                match command {
                    HostCommand::Mount { id, config } => {
                        info!(instance = id, src = %config.src, "mounting player");
                        instances.write().push((id, config));
                    }
                    HostCommand::Unmount { id } => {
                        info!(instance = id, "removing player");
                        instances.write().retain(|(live, _)| *live != id);
                    }
                }
            }
            sleep_ms(POLL_INTERVAL_MS).await;
        }
    });

    rsx! {
        for (id, config) in instances() {
            MusicPlayer { key: "{id}", id, config }
        }
    }
}
