mod ai;
mod feedback;
mod health;
mod opinions;
mod pipeline;
mod report;
mod search;
mod stats;
mod suppress_keywords;
