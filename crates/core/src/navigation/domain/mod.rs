pub mod candidate_windower;
pub mod decision_engine;
pub mod navigation_result;
