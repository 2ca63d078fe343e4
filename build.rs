//! Retrieves information about the version of the game from Git and the build
//! environment. It is printed in the startup banner of the binary.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
