pub mod booking;
pub mod conflict;
pub mod directory;
pub mod store;
pub mod supabase_store;
pub mod upcoming;
pub mod validation;

pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use directory::{ClinicDirectory, DirectoryError, HttpClinicDirectory};
pub use store::{AppointmentStore, InMemoryAppointmentStore, StoreError};
pub use supabase_store::SupabaseAppointmentStore;
pub use upcoming::{next_day_window, UpcomingAppointmentsService};
pub use validation::ExternalValidator;
