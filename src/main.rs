use dioxus::prelude::*;

mod components;
mod config;
mod embed;
mod error;
mod media;
mod registry;
mod state;
mod storage;

use components::PlayerHost;

const PLAYER_CSS: Asset = asset!("/assets/styling/player.css");

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        // A second copy of the script on the same page stays inert.
        if embed::already_installed() {
            return;
        }
        embed::ensure_mount_root();
    }

    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    dioxus::LaunchBuilder::web()
        .with_cfg(dioxus::web::Config::new().rootname(embed::MOUNT_ROOT_ID))
        .launch(App);

    #[cfg(not(all(feature = "web", target_arch = "wasm32")))]
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    #[cfg(target_arch = "wasm32")]
    use_hook(embed::install);

    rsx! {
        document::Stylesheet { href: PLAYER_CSS }

        PlayerHost {}
    }
}
