pub mod combine;
