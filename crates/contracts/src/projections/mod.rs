pub mod p900_sales_transactions;
pub mod p901_receivables_aging;
