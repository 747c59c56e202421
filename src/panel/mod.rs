// Button panel
//
// Resolves catalog buttons to command ids and hands them to the sender.
// This is the caller side of the network layer: it supplies the target
// from settings and turns results into status text.

use anyhow::{anyhow, Result};

use crate::config::{Catalog, CommandButton, Config, ConnectionConfig, Page};
use crate::errors::SendError;
use crate::network::{CommandSender, ConnectionTarget, SendOutcome, Sent};

pub struct Panel {
    catalog: Catalog,
    connection: ConnectionConfig,
    sender: CommandSender,
}

impl Panel {
    pub fn new(catalog: Catalog, config: &Config) -> Self {
        Self {
            catalog,
            connection: config.connection.clone(),
            sender: CommandSender::from_config(&config.command),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Saved connection as a validated target
    pub fn target(&self) -> Result<ConnectionTarget, SendError> {
        ConnectionTarget::new(self.connection.ip.as_str(), i64::from(self.connection.port))
    }

    /// Look up a button by page (id or 1-based index) and button (id or 1-based index)
    pub fn resolve(&self, page: &str, button: &str) -> Result<&CommandButton> {
        let page_entry = self
            .catalog
            .page(page)
            .ok_or_else(|| anyhow!("Unknown page '{}'", page))?;
        page_entry
            .button(button)
            .ok_or_else(|| anyhow!("Page '{}' has no button '{}'", page_entry.id, button))
    }

    /// Press a button. Unknown buttons are an error; send failures are a
    /// failed outcome.
    pub async fn press(&self, page: &str, button: &str) -> Result<SendOutcome> {
        let command_id = self.resolve(page, button)?.id.clone();
        Ok(self.send(&command_id).await)
    }

    /// Send any command id to the saved target
    pub async fn send(&self, command_id: &str) -> SendOutcome {
        match self.target() {
            Ok(target) => self.sender.send(&target, command_id).await,
            Err(e) => Err::<Sent, _>(e).into(),
        }
    }
}

/// Validate connection form input and store it in `config`.
/// Returns the status line shown after saving.
pub fn apply_connection(config: &mut Config, ip: &str, port: &str) -> Result<String, SendError> {
    let target = ConnectionTarget::parse(ip, port)?;
    config.connection.ip = target.ip().to_string();
    config.connection.port = u32::from(target.port());
    Ok(format!("Saved: {}", target))
}

/// Text rendering of a page as a numbered grid
pub fn format_page(page: &Page) -> String {
    let mut output = format!("{} ({})\n", page.title, page.id);
    let mut number = 1;
    for row in page.grid() {
        let cells: Vec<String> = row
            .iter()
            .map(|button| {
                let cell = format!("[{:>2}] {}", number, button.label);
                number += 1;
                cell
            })
            .collect();
        output.push_str("  ");
        output.push_str(&cells.join("  "));
        output.push('\n');
    }
    output
}

/// One line per page: index, id and title
pub fn format_catalog(catalog: &Catalog) -> String {
    catalog
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            format!(
                "{}. {} - {} ({} buttons)\n",
                i + 1,
                page.id,
                page.title,
                page.commands.len()
            )
        })
        .collect()
}
