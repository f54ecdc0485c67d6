pub mod settings;
pub mod system;
pub mod trade;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in trade::definitions()
        .into_iter()
        .chain(settings::definitions())
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}
