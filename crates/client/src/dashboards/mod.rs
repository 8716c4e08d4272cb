pub mod d400_financial_summary;
