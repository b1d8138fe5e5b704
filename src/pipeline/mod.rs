pub mod sorting; // CSV record sorting batch
