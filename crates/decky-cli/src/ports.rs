//! Interactive output port selection (`--showports`).

use std::io::{self, BufRead, Write};

use decky_device::list_output_ports;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortChoice {
    /// Create a virtual port
    Virtual,
    /// Connect to an existing port by index
    Index(usize),
}

/// Interpret one line of user input. Blank keeps the virtual port; anything
/// that isn't a valid index is rejected so the prompt repeats.
pub fn parse_choice(input: &str, port_count: usize) -> Option<PortChoice> {
    let input = input.trim();
    if input.is_empty() {
        return Some(PortChoice::Virtual);
    }
    match input.parse::<usize>() {
        Ok(index) if index < port_count => Some(PortChoice::Index(index)),
        _ => None,
    }
}

/// List the output ports and keep asking until the answer is usable.
pub fn choose_port(virtual_name: &str) -> anyhow::Result<PortChoice> {
    let ports = list_output_ports()?;

    println!("Available ports:");
    for (i, name) in ports.iter().enumerate() {
        println!("{}: {}", i, name);
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("Enter port index (leave blank to use '{}'): ", virtual_name);
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("No port chosen (end of input)");
        }
        if let Some(choice) = parse_choice(&line, ports.len()) {
            return Ok(choice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_virtual() {
        assert_eq!(parse_choice("\n", 3), Some(PortChoice::Virtual));
        assert_eq!(parse_choice("", 0), Some(PortChoice::Virtual));
    }

    #[test]
    fn test_valid_index() {
        assert_eq!(parse_choice(" 2 \n", 3), Some(PortChoice::Index(2)));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(parse_choice("3", 3), None);
        assert_eq!(parse_choice("-1", 3), None);
        assert_eq!(parse_choice("two", 3), None);
    }
}
