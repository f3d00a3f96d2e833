//! Command line interface definitions

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(name = "charrua")]
#[command(about = "Charrua Bus ticketing client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Backend base URL (overrides the configuration file)
    #[arg(long, env = "CHARRUA_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the session file
    #[arg(long)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "CHARRUA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session on the backend and forget it locally
    Logout,
    /// Create an account and log in
    Register {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        apellido: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CHARRUA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        documento: Option<String>,
        #[arg(long)]
        telefono: Option<String>,
    },
    /// Show the logged in user and unread notifications
    Whoami,
    /// Update profile fields
    Profile {
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        apellido: Option<String>,
        #[arg(long)]
        telefono: Option<String>,
    },
    /// Change the account password
    Password {
        #[arg(long)]
        actual: String,
        #[arg(long)]
        nueva: String,
    },
    /// List localities, optionally filtered by name prefix
    Localities {
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Search trips between two localities
    Search {
        #[arg(long)]
        origen: i64,
        #[arg(long)]
        destino: i64,
        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        fecha: String,
        #[arg(long, default_value_t = 1)]
        pasajeros: u32,
    },
    /// Show the seat map of a trip
    Seats { trip_id: i64 },
    /// Book a one way or round trip and print the checkout URL
    Book {
        #[arg(long)]
        origen: i64,
        #[arg(long)]
        destino: i64,
        /// Outbound date (YYYY-MM-DD)
        #[arg(long)]
        ida: String,
        /// Return date (YYYY-MM-DD); makes the booking a round trip
        #[arg(long)]
        vuelta: Option<String>,
        #[arg(long, default_value_t = 1)]
        pasajeros: u32,
        /// Outbound trip id
        #[arg(long)]
        ida_trip: i64,
        /// Outbound seats, comma separated
        #[arg(long)]
        ida_seats: String,
        /// Return trip id
        #[arg(long, requires = "vuelta")]
        vuelta_trip: Option<i64>,
        /// Return seats, comma separated
        #[arg(long, requires = "vuelta")]
        vuelta_seats: Option<String>,
    },
    /// Complete a payment from its return link
    Pay {
        /// charruabus://pago/exitoso?session_id=... or .../cancelado?...
        link: String,
    },
    /// List purchased tickets
    Tickets {
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    /// List purchases
    Purchases {
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    /// Cancel a ticket
    CancelTicket { ticket_id: i64 },
    /// Show notifications
    Notifications {
        /// Keep polling the unread counter until interrupted
        #[arg(short, long)]
        watch: bool,
        /// Mark every notification as read
        #[arg(long)]
        mark_all_read: bool,
        /// Mark one notification as read
        #[arg(long)]
        read: Option<i64>,
    },
    /// Show the effective client configuration and backend limits
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip_booking() {
        let cli = Cli::try_parse_from([
            "charrua",
            "book",
            "--origen",
            "1",
            "--destino",
            "2",
            "--ida",
            "2025-06-01",
            "--vuelta",
            "2025-06-05",
            "--pasajeros",
            "2",
            "--ida-trip",
            "5",
            "--ida-seats",
            "10,11",
            "--vuelta-trip",
            "9",
            "--vuelta-seats",
            "3,4",
        ])
        .unwrap();

        match cli.command {
            Commands::Book {
                vuelta,
                vuelta_trip,
                pasajeros,
                ..
            } => {
                assert_eq!(vuelta.as_deref(), Some("2025-06-05"));
                assert_eq!(vuelta_trip, Some(9));
                assert_eq!(pasajeros, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_return_trip_requires_return_date() {
        let result = Cli::try_parse_from([
            "charrua",
            "book",
            "--origen",
            "1",
            "--destino",
            "2",
            "--ida",
            "2025-06-01",
            "--ida-trip",
            "5",
            "--ida-seats",
            "10",
            "--vuelta-trip",
            "9",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["charrua", "-v", "--data-dir", "/tmp/c", "whoami"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/c"));
        assert_eq!(cli.command, Commands::Whoami);
    }
}
