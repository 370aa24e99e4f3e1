//! Pages module - generates the HTML upload form page.

/// Generate the upload form page.
///
/// The form posts `image` and `map_html` to `/process` and renders the
/// returned markup preview plus the archive download link client-side.
pub fn render_upload_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Map Slicer</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            background: #f4f5f7;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            color: #1f2430;
            padding: 32px 16px;
        }}
        .card {{
            max-width: 720px;
            margin: 0 auto;
            background: #fff;
            border-radius: 8px;
            border: 1px solid #e1e4e8;
            padding: 24px;
        }}
        h1 {{
            font-size: 20px;
            margin-bottom: 4px;
        }}
        .subtitle {{
            color: #6a737d;
            font-size: 13px;
            margin-bottom: 20px;
        }}
        label {{
            display: block;
            font-size: 13px;
            font-weight: 600;
            margin: 16px 0 6px;
        }}
        input[type="file"], textarea {{
            width: 100%;
            font-size: 13px;
            border: 1px solid #d1d5da;
            border-radius: 6px;
            padding: 8px;
        }}
        textarea {{
            min-height: 160px;
            font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
        }}
        button {{
            margin-top: 20px;
            background: #2563eb;
            color: #fff;
            border: none;
            border-radius: 6px;
            padding: 10px 18px;
            font-size: 14px;
            cursor: pointer;
        }}
        button:disabled {{
            background: #93b4f5;
            cursor: wait;
        }}
        #result {{
            margin-top: 24px;
            display: none;
        }}
        #result.error .status {{
            color: #b91c1c;
        }}
        .status {{
            font-size: 13px;
            margin-bottom: 8px;
        }}
        .warnings {{
            font-size: 12px;
            color: #92400e;
            background: #fef3c7;
            border-radius: 6px;
            padding: 8px 12px;
            margin-bottom: 12px;
            white-space: pre-wrap;
        }}
        iframe {{
            width: 100%;
            height: 480px;
            border: 1px solid #e1e4e8;
            border-radius: 6px;
            background: #fff;
        }}
    </style>
</head>
<body>
    <div class="card">
        <h1>Map Slicer</h1>
        <p class="subtitle">Slice an image along its image-map regions and build responsive email markup.</p>
        <form id="upload-form">
            <label for="image">Source image (PNG, JPG, JPEG, GIF)</label>
            <input type="file" id="image" name="image" accept=".png,.jpg,.jpeg,.gif" required>
            <label for="map_html">Image-map markup</label>
            <textarea id="map_html" name="map_html" placeholder='&lt;area shape="rect" coords="0,0,300,150" href="https://example.com"&gt;' required></textarea>
            <button type="submit" id="submit">Slice</button>
        </form>
        <div id="result">
            <p class="status" id="status"></p>
            <div class="warnings" id="warnings" style="display:none"></div>
            <p class="status"><a id="download" href="#">Download archive</a></p>
            <iframe id="preview" title="Generated markup preview"></iframe>
        </div>
    </div>
    <script>
        const form = document.getElementById('upload-form');
        const result = document.getElementById('result');
        const status = document.getElementById('status');
        const warnings = document.getElementById('warnings');
        const download = document.getElementById('download');
        const preview = document.getElementById('preview');
        const submit = document.getElementById('submit');

        form.addEventListener('submit', async (event) => {{
            event.preventDefault();
            submit.disabled = true;
            result.style.display = 'none';
            result.classList.remove('error');

            try {{
                const response = await fetch('/process', {{
                    method: 'POST',
                    body: new FormData(form),
                }});
                const body = await response.json();
                result.style.display = 'block';

                if (!response.ok) {{
                    result.classList.add('error');
                    status.textContent = `Failed at stage "${{body.stage}}": ${{body.message}}`;
                    warnings.style.display = 'none';
                    download.parentElement.style.display = 'none';
                    preview.style.display = 'none';
                    return;
                }}

                status.textContent = `Produced ${{body.slice_count}} slice(s) in session ${{body.session_id}}.`;
                if (body.warnings.messages.length > 0) {{
                    warnings.style.display = 'block';
                    warnings.textContent = body.warnings.messages.join('\n');
                }} else {{
                    warnings.style.display = 'none';
                }}
                download.parentElement.style.display = 'block';
                download.href = body.download_url;
                preview.style.display = 'block';
                preview.srcdoc = body.html;
            }} catch (err) {{
                result.style.display = 'block';
                result.classList.add('error');
                status.textContent = `Request failed: ${{err}}`;
            }} finally {{
                submit.disabled = false;
            }}
        }});
    </script>
</body>
</html>"##
    )
}
