mod fixture;
mod phases;
