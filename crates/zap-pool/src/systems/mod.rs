pub mod suicide;
