pub mod datafast;
pub mod ticket_reservations;

pub use datafast::DataFastGateway;
pub use ticket_reservations::TicketReservationNotifier;
