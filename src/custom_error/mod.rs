pub mod cust_error;
