// Esquema Diesel de las tablas de empleados.
// Tablas: employees, employee_sequence
diesel::table! {
    employees (employee_id) {
        employee_id -> BigInt,
        employee_code -> Text,
        first_name -> Text,
        last_name -> Text,
        mobile_no -> Text,
        email -> Nullable<Text>,
        aadhaar_no -> Text,
        pan_no -> Text,
        account_no -> Text,
        ifsc_code -> Text,
        bank_name -> Text,
        uan_no -> Nullable<Text>,
        pf_no -> Nullable<Text>,
        qualification -> Nullable<Text>,
        dob -> Date,
        address -> Text,
        status -> Text,
        date_of_joining -> Date,
        date_of_leaving -> Nullable<Date>,
        aadhaar_document -> Nullable<Text>,
        pan_document -> Nullable<Text>,
        photo -> Nullable<Text>,
        other_documents -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
diesel::table! {
    employee_sequence (name) {
        name -> Text,
        value -> BigInt,
    }
}
